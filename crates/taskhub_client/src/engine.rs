use crate::cache::{QueryCache, QueryKey, QuerySnapshot};
use anyhow::Context as _;
use std::sync::Arc;
use taskhub_api::{
    ChangePasswordRequest, ClientAction, ClientEvent, HeaderSnapshot, ProfileUpdate,
    SelectionSource, UserProfile, WorkspaceSnapshot,
};
use taskhub_backend::UserProfileApi;
use taskhub_domain::{
    Action, Effect, HeaderState, RouteState, SelectionState, SelectionStoreService, Workspace,
    WorkspaceId,
};
use tokio::sync::{broadcast, mpsc, oneshot};

pub fn user_profile_key() -> QueryKey {
    QueryKey::new(["user"])
}

const PROFILE_FETCH_TOAST: &str = "Failed to load user data";

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn header_snapshot(&self) -> anyhow::Result<HeaderSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::GetHeaderSnapshot { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }

    pub async fn apply_client_action(&self, action: ClientAction) -> Result<u64, String> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::ApplyClientAction { action, reply: tx })
            .await
            .is_err()
        {
            return Err("engine unavailable".to_owned());
        }
        rx.await.unwrap_or_else(|_| Err("engine stopped".to_owned()))
    }

    /// Current user profile, served from the cache when fresh. A transient
    /// fetch failure surfaces here and as a `Toast` event; previously known
    /// data stays visible through `peek_user_profile`.
    pub async fn user_profile(&self) -> Result<UserProfile, String> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::GetUserProfile { reply: tx })
            .await
            .is_err()
        {
            return Err("engine unavailable".to_owned());
        }
        rx.await.unwrap_or_else(|_| Err("engine stopped".to_owned()))
    }

    pub async fn peek_user_profile(&self) -> QuerySnapshot<UserProfile> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::PeekUserProfile { reply: tx })
            .await
            .is_err()
        {
            return QuerySnapshot::default();
        }
        rx.await.unwrap_or_default()
    }

    pub async fn update_user_profile(&self, update: ProfileUpdate) -> Result<UserProfile, String> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::UpdateUserProfile { update, reply: tx })
            .await
            .is_err()
        {
            return Err("engine unavailable".to_owned());
        }
        rx.await.unwrap_or_else(|_| Err("engine stopped".to_owned()))
    }

    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<(), String> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineCommand::ChangePassword { request, reply: tx })
            .await
            .is_err()
        {
            return Err("engine unavailable".to_owned());
        }
        rx.await.unwrap_or_else(|_| Err("engine stopped".to_owned()))
    }
}

pub enum EngineCommand {
    GetHeaderSnapshot {
        reply: oneshot::Sender<HeaderSnapshot>,
    },
    ApplyClientAction {
        action: ClientAction,
        reply: oneshot::Sender<Result<u64, String>>,
    },
    GetUserProfile {
        reply: oneshot::Sender<Result<UserProfile, String>>,
    },
    PeekUserProfile {
        reply: oneshot::Sender<QuerySnapshot<UserProfile>>,
    },
    UpdateUserProfile {
        update: ProfileUpdate,
        reply: oneshot::Sender<Result<UserProfile, String>>,
    },
    ChangePassword {
        request: ChangePasswordRequest,
        reply: oneshot::Sender<Result<(), String>>,
    },
    DispatchAction {
        action: Box<Action>,
    },
}

pub struct Engine {
    state: HeaderState,
    rev: u64,
    store: Arc<dyn SelectionStoreService>,
    api: Arc<dyn UserProfileApi>,
    profile: QueryCache<UserProfile>,
    events: broadcast::Sender<ClientEvent>,
    tx: mpsc::Sender<EngineCommand>,
}

impl Engine {
    pub fn start(
        store: Arc<dyn SelectionStoreService>,
        api: Arc<dyn UserProfileApi>,
        profile: QueryCache<UserProfile>,
        initial_url: &str,
    ) -> (EngineHandle, broadcast::Sender<ClientEvent>) {
        let (tx, mut rx) = mpsc::channel::<EngineCommand>(256);
        let (events, _) = broadcast::channel::<ClientEvent>(256);

        let mut engine = Self {
            state: HeaderState::new(),
            rev: 0,
            store,
            api,
            profile,
            events: events.clone(),
            tx: tx.clone(),
        };

        let initial_route = RouteState::parse(initial_url);
        tokio::spawn(async move {
            engine.bootstrap(initial_route);
            while let Some(cmd) = rx.recv().await {
                engine.handle(cmd);
            }
        });

        (EngineHandle { tx }, events)
    }

    fn bootstrap(&mut self, initial_route: RouteState) {
        self.apply_action(Action::RouteChanged {
            route: initial_route,
        });
        self.apply_action(Action::AppStarted);
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::GetHeaderSnapshot { reply } => {
                let _ = reply.send(self.header_snapshot());
            }
            EngineCommand::ApplyClientAction { action, reply } => {
                self.apply_action(map_client_action(action));
                let _ = reply.send(Ok(self.rev));
            }
            EngineCommand::GetUserProfile { reply } => {
                let cache = self.profile.clone();
                let api = self.api.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = cache
                        .fetch(user_profile_key(), move || api.fetch_profile())
                        .await;
                    if let Err(err) = &result {
                        tracing::warn!(error = %err, "user profile fetch failed");
                        let _ = events.send(ClientEvent::Toast {
                            message: PROFILE_FETCH_TOAST.to_owned(),
                        });
                    }
                    let _ = reply.send(result);
                });
            }
            EngineCommand::PeekUserProfile { reply } => {
                let cache = self.profile.clone();
                tokio::spawn(async move {
                    let _ = reply.send(cache.peek(user_profile_key()).await);
                });
            }
            EngineCommand::UpdateUserProfile { update, reply } => {
                let cache = self.profile.clone();
                let api = self.api.clone();
                tokio::spawn(async move {
                    let result = cache
                        .mutate(user_profile_key(), api.update_profile(update))
                        .await;
                    let _ = reply.send(result);
                });
            }
            EngineCommand::ChangePassword { request, reply } => {
                let api = self.api.clone();
                tokio::spawn(async move {
                    let _ = reply.send(api.change_password(request).await);
                });
            }
            EngineCommand::DispatchAction { action } => {
                self.apply_action(*action);
            }
        }
    }

    fn apply_action(&mut self, action: Action) {
        self.rev = self.rev.saturating_add(1);
        let effects = self.state.apply(action);
        self.publish_header_snapshot();

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::LoadPersistedSelection => {
                let store = self.store.clone();
                let tx = self.tx.clone();
                tokio::task::spawn_blocking(move || {
                    let action = match store.read_selection() {
                        Ok(raw) => Action::PersistedSelectionLoaded { raw },
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to read persisted selection");
                            Action::PersistedSelectionLoadFailed { message: err }
                        }
                    };
                    let _ = tx.blocking_send(EngineCommand::DispatchAction {
                        action: Box::new(action),
                    });
                });
            }
            Effect::SelectionChanged { workspace } => {
                let _ = self.events.send(ClientEvent::WorkspaceSelected {
                    workspace: workspace_snapshot(&workspace),
                });
            }
            Effect::Navigate { target } => {
                let _ = self.events.send(ClientEvent::Navigate { target });
            }
        }
    }

    fn publish_header_snapshot(&self) {
        let _ = self.events.send(ClientEvent::HeaderChanged {
            rev: self.rev,
            header: Box::new(self.header_snapshot()),
        });
    }

    fn header_snapshot(&self) -> HeaderSnapshot {
        let selection_source = match &self.state.selection {
            SelectionState::Unresolved => SelectionSource::None,
            SelectionState::Persisted(_) => SelectionSource::Persisted,
            SelectionState::Explicit(_) => SelectionSource::Explicit,
        };
        HeaderSnapshot {
            rev: self.rev,
            workspaces: self.state.workspaces.iter().map(workspace_snapshot).collect(),
            selected_workspace: self.state.active_workspace().map(workspace_snapshot),
            selection_source,
            last_error: self.state.last_error.clone(),
        }
    }
}

fn workspace_snapshot(workspace: &Workspace) -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        id: workspace.id.as_str().to_owned(),
        name: workspace.name.clone(),
        color: workspace.color.clone(),
    }
}

fn map_client_action(action: ClientAction) -> Action {
    match action {
        ClientAction::RouteChanged { url } => Action::RouteChanged {
            route: RouteState::parse(&url),
        },
        ClientAction::WorkspacesLoaded { workspaces } => Action::WorkspacesLoaded {
            workspaces: workspaces
                .into_iter()
                .map(|w| Workspace {
                    id: WorkspaceId::new(w.id),
                    name: w.name,
                    color: w.color,
                })
                .collect(),
        },
        ClientAction::SelectWorkspace { workspace_id } => Action::SelectWorkspace {
            workspace_id: WorkspaceId::new(workspace_id),
        },
        ClientAction::ClearError => Action::ClearError,
    }
}
