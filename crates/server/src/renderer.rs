//! Template-to-state rendering.

use scorehud_core::{LineTemplate, RenderedState};
use scorehud_placeholder::{ProviderRegistry, RenderContext};

/// Resolve every template line for one subject and key it by rank.
///
/// The first line gets rank `N` and the last rank `1`, so a sink that shows
/// higher scores first displays the lines in template order.
pub fn render_lines(
    template: &LineTemplate,
    registry: &mut ProviderRegistry,
    ctx: &RenderContext<'_>,
) -> RenderedState {
    template
        .ranked()
        .map(|(rank, line)| (rank, registry.render_line(line, ctx)))
        .collect()
}
