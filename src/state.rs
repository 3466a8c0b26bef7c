use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    ChatHistoryLoadingState, Conversation, CosmosDbHealth, Feedback, FrontendSettings,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    pub is_chat_history_open: bool,
    pub chat_history_loading_state: ChatHistoryLoadingState,
    pub is_cosmos_db_available: CosmosDbHealth,
    pub chat_history: Option<Vec<Conversation>>,
    pub filtered_chat_history: Option<Vec<Conversation>>,
    pub current_chat: Option<Conversation>,
    pub frontend_settings: Option<FrontendSettings>,
    pub feedback_state: HashMap<String, Feedback>,
    pub is_loading: bool,
    pub answer_exec_result: HashMap<String, Vec<serde_json::Value>>,
}

impl AppState {
    pub fn feedback_for(&self, answer_id: &str) -> Option<Feedback> {
        self.feedback_state.get(answer_id).copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    ToggleChatHistory,
    #[serde(rename = "SET_COSMOSDB_STATUS")]
    SetCosmosDbStatus(CosmosDbHealth),
    UpdateChatHistoryLoadingState(ChatHistoryLoadingState),
    UpdateCurrentChat(Option<Conversation>),
    UpdateFilteredChatHistory(Option<Vec<Conversation>>),
    UpdateChatHistory(Conversation),
    UpdateChatTitle(Conversation),
    DeleteChatEntry(String),
    DeleteChatHistory,
    DeleteCurrentChatMessages(String),
    FetchChatHistory(Option<Vec<Conversation>>),
    FetchFrontendSettings(Option<FrontendSettings>),
    SetFeedbackState {
        #[serde(rename = "answerId")]
        answer_id: String,
        feedback: Feedback,
    },
    GetFeedbackState(String),
    SetAnswerExecResult {
        #[serde(rename = "answerId")]
        answer_id: String,
        exec_result: Vec<serde_json::Value>,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ToggleChatHistory => "TOGGLE_CHAT_HISTORY",
            Action::SetCosmosDbStatus(_) => "SET_COSMOSDB_STATUS",
            Action::UpdateChatHistoryLoadingState(_) => "UPDATE_CHAT_HISTORY_LOADING_STATE",
            Action::UpdateCurrentChat(_) => "UPDATE_CURRENT_CHAT",
            Action::UpdateFilteredChatHistory(_) => "UPDATE_FILTERED_CHAT_HISTORY",
            Action::UpdateChatHistory(_) => "UPDATE_CHAT_HISTORY",
            Action::UpdateChatTitle(_) => "UPDATE_CHAT_TITLE",
            Action::DeleteChatEntry(_) => "DELETE_CHAT_ENTRY",
            Action::DeleteChatHistory => "DELETE_CHAT_HISTORY",
            Action::DeleteCurrentChatMessages(_) => "DELETE_CURRENT_CHAT_MESSAGES",
            Action::FetchChatHistory(_) => "FETCH_CHAT_HISTORY",
            Action::FetchFrontendSettings(_) => "FETCH_FRONTEND_SETTINGS",
            Action::SetFeedbackState { .. } => "SET_FEEDBACK_STATE",
            Action::GetFeedbackState(_) => "GET_FEEDBACK_STATE",
            Action::SetAnswerExecResult { .. } => "SET_ANSWER_EXEC_RESULT",
        }
    }
}

pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::ToggleChatHistory => AppState {
            is_chat_history_open: !state.is_chat_history_open,
            ..state
        },
        Action::SetCosmosDbStatus(health) => AppState {
            is_cosmos_db_available: health,
            ..state
        },
        Action::UpdateChatHistoryLoadingState(loading) => AppState {
            chat_history_loading_state: loading,
            ..state
        },
        Action::UpdateCurrentChat(chat) => AppState {
            current_chat: chat,
            ..state
        },
        Action::UpdateFilteredChatHistory(filtered) => AppState {
            filtered_chat_history: filtered,
            ..state
        },
        Action::UpdateChatHistory(conversation) => {
            let (Some(mut history), Some(current)) =
                (state.chat_history.clone(), state.current_chat.clone())
            else {
                return state;
            };

            // An existing entry takes the current chat's content; the payload
            // only identifies which slot to refresh.
            match history.iter().position(|conv| conv.id == conversation.id) {
                Some(idx) => history[idx] = current,
                None => history.push(conversation),
            }
            AppState {
                chat_history: Some(history),
                ..state
            }
        }
        Action::UpdateChatTitle(conversation) => {
            let Some(history) = state.chat_history.clone() else {
                return AppState {
                    chat_history: Some(Vec::new()),
                    ..state
                };
            };

            let in_history = history.iter().any(|chat| chat.id == conversation.id);
            let history = history
                .into_iter()
                .map(|chat| {
                    if chat.id == conversation.id {
                        Conversation {
                            title: conversation.title.clone(),
                            ..chat
                        }
                    } else {
                        chat
                    }
                })
                .collect();

            let current_chat = state.current_chat.clone().map(|chat| {
                if in_history && chat.id == conversation.id {
                    Conversation {
                        title: conversation.title.clone(),
                        ..chat
                    }
                } else {
                    chat
                }
            });

            AppState {
                chat_history: Some(history),
                current_chat,
                ..state
            }
        }
        Action::DeleteChatEntry(id) => {
            let Some(history) = state.chat_history.clone() else {
                return AppState {
                    chat_history: Some(Vec::new()),
                    ..state
                };
            };

            AppState {
                chat_history: Some(history.into_iter().filter(|chat| chat.id != id).collect()),
                current_chat: None,
                ..state
            }
        }
        Action::DeleteChatHistory => AppState {
            chat_history: Some(Vec::new()),
            filtered_chat_history: Some(Vec::new()),
            current_chat: None,
            ..state
        },
        Action::DeleteCurrentChatMessages(_) => {
            if state.chat_history.is_none() {
                return state;
            }
            let Some(current) = state.current_chat.clone() else {
                return state;
            };

            AppState {
                current_chat: Some(Conversation {
                    messages: Vec::new(),
                    ..current
                }),
                ..state
            }
        }
        Action::FetchChatHistory(history) => AppState {
            chat_history: history,
            ..state
        },
        Action::FetchFrontendSettings(settings) => AppState {
            is_loading: false,
            frontend_settings: settings,
            ..state
        },
        Action::SetFeedbackState {
            answer_id,
            feedback,
        } => {
            let mut feedback_state = state.feedback_state.clone();
            feedback_state.insert(answer_id, feedback);
            AppState {
                feedback_state,
                ..state
            }
        }
        Action::GetFeedbackState(_) => state,
        Action::SetAnswerExecResult {
            answer_id,
            exec_result,
        } => {
            let mut answer_exec_result = state.answer_exec_result.clone();
            answer_exec_result.insert(answer_id, exec_result);
            AppState {
                answer_exec_result,
                ..state
            }
        }
    }
}

/// Owns the client state and applies dispatched actions through [`reduce`].
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> &AppState {
        tracing::debug!(action = action.kind(), "dispatching state action");
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
        &self.state
    }
}
