//! Diff-and-push scoreboard engine.
//!
//! Every active subject owns a session holding the state last pushed to its
//! sink. An update re-renders the template and talks to the sink only when
//! the result differs from that state (or when forced). Pushes are always a
//! remove of the new ranks followed by a set. Ranks that only the previous
//! state used are not removed, so lines dropped from a shrinking template
//! stay on screen until the display is recreated.
//!
//! All methods run on the game thread. Asynchronous provider results are
//! applied in [`ScoreboardEngine::pump_completions`]; results addressed to a
//! handle that no longer has a session are dropped there.

use crate::renderer::render_lines;
use anyhow::Result;
use scorehud_core::{
    DisplaySink, LineTemplate, RenderedState, ServerStats, SessionHost, SimTick, SubjectHandle,
    SubjectId, SubjectSnapshot,
};
use scorehud_placeholder::{ProviderRegistry, RenderContext};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors from activating a display.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The host does not know the subject.
    #[error("subject {0} is not connected")]
    UnknownSubject(SubjectId),

    /// The sink refused to allocate the display.
    #[error("failed to create display for {subject}: {reason:#}")]
    CreateDisplay {
        /// Subject whose display could not be created.
        subject: SubjectId,
        /// Sink error.
        reason: anyhow::Error,
    },
}

/// Per-subject state; exists only while the subject's display is active.
#[derive(Debug)]
struct Session {
    id: SubjectId,
    rendered: RenderedState,
}

/// Owns the sessions of every subject with an active display.
pub struct ScoreboardEngine<S> {
    sink: S,
    registry: ProviderRegistry,
    template: LineTemplate,
    title: String,
    /// BTreeMap keeps per-tick iteration order stable.
    sessions: BTreeMap<SubjectHandle, Session>,
    handles: HashMap<SubjectId, SubjectHandle>,
    next_handle: u64,
}

impl<S: DisplaySink> ScoreboardEngine<S> {
    /// Create an engine with no active displays.
    pub fn new(
        sink: S,
        registry: ProviderRegistry,
        template: LineTemplate,
        title: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            registry,
            template,
            title: title.into(),
            sessions: BTreeMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Give `id` a display and push its first render.
    ///
    /// Activating an already active subject is a no-op that returns the
    /// existing handle.
    #[instrument(skip(self, host), fields(subject = %id))]
    pub fn activate(
        &mut self,
        host: &dyn SessionHost,
        id: &SubjectId,
    ) -> Result<SubjectHandle, EngineError> {
        if let Some(handle) = self.handles.get(id) {
            debug!(%handle, "display already active");
            return Ok(*handle);
        }
        let snapshot = host
            .subject(id)
            .ok_or_else(|| EngineError::UnknownSubject(id.clone()))?;

        self.sink
            .create_display(id, &self.title)
            .map_err(|reason| EngineError::CreateDisplay {
                subject: id.clone(),
                reason,
            })?;

        let handle = SubjectHandle(self.next_handle);
        self.next_handle += 1;
        self.sessions.insert(
            handle,
            Session {
                id: id.clone(),
                rendered: RenderedState::new(),
            },
        );
        self.handles.insert(id.clone(), handle);

        let stats = host.server_stats();
        let now = host.current_tick();
        self.registry.on_activate(&RenderContext {
            handle,
            subject: &snapshot,
            server: &stats,
            now,
        });
        self.push(handle, &snapshot, &stats, now, true);
        info!(%handle, "scoreboard display created");
        Ok(handle)
    }

    /// Re-render `id` and push if the output changed (or `force` is set).
    ///
    /// Returns true if the sink was written to. Inactive subjects are a no-op.
    pub fn update(&mut self, host: &dyn SessionHost, id: &SubjectId, force: bool) -> bool {
        let Some(&handle) = self.handles.get(id) else {
            return false;
        };
        let Some(snapshot) = host.subject(id) else {
            debug!(subject = %id, "host no longer knows subject; skipping update");
            return false;
        };
        let stats = host.server_stats();
        self.push(handle, &snapshot, &stats, host.current_tick(), force)
    }

    /// Remove `id`'s display and everything cached for it.
    ///
    /// Returns false if the subject had no display.
    pub fn deactivate(&mut self, id: &SubjectId) -> bool {
        let Some(handle) = self.handles.remove(id) else {
            return false;
        };
        self.sessions.remove(&handle);
        self.registry.on_deactivate(handle);
        if let Err(err) = self.sink.remove_display(id) {
            warn!(subject = %id, "failed to remove display: {err:#}");
        }
        info!(subject = %id, %handle, "scoreboard display removed");
        true
    }

    /// Adopt `template` and run a non-forced update for every session.
    ///
    /// Returns the number of subjects whose sink was written to.
    #[instrument(skip_all, fields(sessions = self.sessions.len()))]
    pub fn refresh_all(&mut self, host: &dyn SessionHost, template: LineTemplate) -> usize {
        if template != self.template {
            debug!(lines = template.len(), "line template changed");
        }
        self.template = template;
        self.update_all(host, false)
    }

    /// Update every session. Sessions whose subject the host no longer
    /// reports as online are discarded without touching the sink.
    pub fn update_all(&mut self, host: &dyn SessionHost, force: bool) -> usize {
        let stats = host.server_stats();
        let now = host.current_tick();
        let targets: Vec<(SubjectHandle, SubjectId)> = self
            .sessions
            .iter()
            .map(|(handle, session)| (*handle, session.id.clone()))
            .collect();

        let mut pushed = 0;
        for (handle, id) in targets {
            match host.subject(&id) {
                Some(snapshot) if snapshot.online => {
                    if self.push(handle, &snapshot, &stats, now, force) {
                        pushed += 1;
                    }
                }
                _ => self.prune(handle, &id),
            }
        }
        pushed
    }

    /// Apply asynchronous provider results, then update the subjects whose
    /// data changed. Returns the number of subjects pushed.
    pub fn pump_completions(&mut self, host: &dyn SessionHost) -> usize {
        let sessions = &self.sessions;
        let touched = self
            .registry
            .pump(&|handle| sessions.contains_key(&handle));
        if touched.is_empty() {
            return 0;
        }

        let stats = host.server_stats();
        let now = host.current_tick();
        let mut pushed = 0;
        for handle in touched {
            let Some(id) = self.sessions.get(&handle).map(|session| session.id.clone()) else {
                continue;
            };
            if let Some(snapshot) = host.subject(&id) {
                if self.push(handle, &snapshot, &stats, now, false) {
                    pushed += 1;
                }
            }
        }
        pushed
    }

    /// Forward host-reported activity for `id` to the providers.
    pub fn note_activity(&mut self, host: &dyn SessionHost, id: &SubjectId) {
        let Some(&handle) = self.handles.get(id) else {
            return;
        };
        let Some(snapshot) = host.subject(id) else {
            return;
        };
        let stats = host.server_stats();
        self.registry.on_activity(&RenderContext {
            handle,
            subject: &snapshot,
            server: &stats,
            now: host.current_tick(),
        });
    }

    /// Ask providers to refresh externally sourced data for every session.
    pub fn refresh_external(&mut self, host: &dyn SessionHost) {
        let snapshots: Vec<(SubjectHandle, SubjectSnapshot)> = self
            .sessions
            .iter()
            .filter_map(|(handle, session)| host.subject(&session.id).map(|s| (*handle, s)))
            .collect();
        let stats = host.server_stats();
        let now = host.current_tick();
        let contexts: Vec<RenderContext<'_>> = snapshots
            .iter()
            .map(|(handle, snapshot)| RenderContext {
                handle: *handle,
                subject: snapshot,
                server: &stats,
                now,
            })
            .collect();
        self.registry.refresh_external(&contexts);
    }

    /// Change the sidebar title, re-titling every active display.
    pub fn set_title(&mut self, title: &str) {
        if self.title == title {
            return;
        }
        self.title = title.to_string();
        for session in self.sessions.values() {
            if let Err(err) = self.sink.create_display(&session.id, &self.title) {
                warn!(subject = %session.id, "failed to re-title display: {err:#}");
            }
        }
    }

    /// Replace the template without pushing anything.
    pub fn set_template(&mut self, template: LineTemplate) {
        self.template = template;
    }

    /// True if `id` has an active display.
    pub fn is_active(&self, id: &SubjectId) -> bool {
        self.handles.contains_key(id)
    }

    /// State last pushed for `id`.
    pub fn rendered(&self, id: &SubjectId) -> Option<&RenderedState> {
        let handle = self.handles.get(id)?;
        self.sessions.get(handle).map(|session| &session.rendered)
    }

    /// Number of active displays.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Subjects with active displays, in activation order.
    pub fn active_subjects(&self) -> Vec<SubjectId> {
        self.sessions
            .values()
            .map(|session| session.id.clone())
            .collect()
    }

    /// Current template.
    pub fn template(&self) -> &LineTemplate {
        &self.template
    }

    /// Current title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Provider chain.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Mutable provider chain.
    pub fn registry_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.registry
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Tear the engine down, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn push(
        &mut self,
        handle: SubjectHandle,
        snapshot: &SubjectSnapshot,
        stats: &ServerStats,
        now: SimTick,
        force: bool,
    ) -> bool {
        let ctx = RenderContext {
            handle,
            subject: snapshot,
            server: stats,
            now,
        };
        let rendered = render_lines(&self.template, &mut self.registry, &ctx);
        let Some(session) = self.sessions.get_mut(&handle) else {
            return false;
        };
        if !force && rendered == session.rendered {
            return false;
        }

        match send(&mut self.sink, &session.id, &rendered) {
            Ok(()) => {
                debug!(subject = %session.id, lines = rendered.len(), force, "pushed scoreboard");
                session.rendered = rendered;
                true
            }
            Err(err) => {
                warn!(subject = %session.id, "failed to push scoreboard: {err:#}");
                // Forget what the client has so the next update pushes again.
                session.rendered = RenderedState::new();
                false
            }
        }
    }

    fn prune(&mut self, handle: SubjectHandle, id: &SubjectId) {
        self.sessions.remove(&handle);
        if self.handles.get(id) == Some(&handle) {
            self.handles.remove(id);
        }
        self.registry.on_deactivate(handle);
        debug!(subject = %id, %handle, "pruned session of disconnected subject");
    }
}

fn send<S: DisplaySink>(sink: &mut S, id: &SubjectId, state: &RenderedState) -> Result<()> {
    sink.remove_entries(id, &state.ranks())?;
    sink.set_entries(id, state)
}
