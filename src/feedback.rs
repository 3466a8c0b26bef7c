use serde::Serialize;

use crate::models::Feedback;
use crate::state::Action;

/// Side effects the caller must perform after a feedback interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackEffect {
    pub dispatch: Option<Action>,
    pub submit: Option<String>,
}

impl FeedbackEffect {
    pub fn is_empty(&self) -> bool {
        self.dispatch.is_none() && self.submit.is_none()
    }
}

/// Like/dislike state of a single answer card.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    message_id: Option<String>,
    state: Option<Feedback>,
    dialog_open: bool,
    reasons: Vec<Feedback>,
}

impl AnswerFeedback {
    pub fn new(message_id: Option<String>, initial: Option<Feedback>) -> Self {
        Self {
            message_id,
            state: initial,
            dialog_open: false,
            reasons: Vec::new(),
        }
    }

    pub fn state(&self) -> Option<Feedback> {
        self.state
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn reasons(&self) -> &[Feedback] {
        &self.reasons
    }

    pub fn like(&mut self) -> FeedbackEffect {
        let Some(message_id) = self.message_id.clone() else {
            return FeedbackEffect::default();
        };

        let next = if self.state == Some(Feedback::Positive) {
            Feedback::Neutral
        } else {
            Feedback::Positive
        };
        self.state = Some(next);

        FeedbackEffect {
            dispatch: Some(Action::SetFeedbackState {
                answer_id: message_id,
                feedback: next,
            }),
            submit: Some(next.as_str().to_string()),
        }
    }

    /// A second dislike resets to neutral; the first one only opens the
    /// reason dialog, submission waits for `submit_reasons`.
    pub fn dislike(&mut self) -> FeedbackEffect {
        if self.message_id.is_none() {
            return FeedbackEffect::default();
        }

        if self.state == Some(Feedback::Negative) {
            self.state = Some(Feedback::Neutral);
            return FeedbackEffect {
                dispatch: None,
                submit: Some(Feedback::Neutral.as_str().to_string()),
            };
        }

        self.state = Some(Feedback::Negative);
        self.dialog_open = true;
        FeedbackEffect::default()
    }

    pub fn toggle_reason(&mut self, reason: Feedback, checked: bool) {
        if checked {
            if !self.reasons.contains(&reason) {
                self.reasons.push(reason);
            }
        } else {
            self.reasons.retain(|selected| *selected != reason);
        }
    }

    pub fn submit_reasons(&mut self) -> FeedbackEffect {
        if self.message_id.is_none() {
            return FeedbackEffect::default();
        }

        let joined = self
            .reasons
            .iter()
            .map(|reason| reason.as_str())
            .collect::<Vec<_>>()
            .join(",");

        self.dialog_open = false;
        self.reasons.clear();

        FeedbackEffect {
            dispatch: None,
            submit: Some(joined),
        }
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> AnswerFeedback {
        AnswerFeedback::new(Some("answer-1".to_string()), None)
    }

    #[test]
    fn like_toggles_between_positive_and_neutral() {
        let mut feedback = card();

        let effect = feedback.like();
        assert_eq!(feedback.state(), Some(Feedback::Positive));
        assert_eq!(effect.submit.as_deref(), Some("positive"));
        assert_eq!(
            effect.dispatch,
            Some(Action::SetFeedbackState {
                answer_id: "answer-1".to_string(),
                feedback: Feedback::Positive,
            })
        );

        let effect = feedback.like();
        assert_eq!(feedback.state(), Some(Feedback::Neutral));
        assert_eq!(effect.submit.as_deref(), Some("neutral"));
    }

    #[test]
    fn first_dislike_opens_dialog_without_submitting() {
        let mut feedback = card();
        let effect = feedback.dislike();

        assert!(effect.is_empty());
        assert!(feedback.is_dialog_open());
        assert_eq!(feedback.state(), Some(Feedback::Negative));

        let effect = feedback.dislike();
        assert_eq!(effect.submit.as_deref(), Some("neutral"));
        assert_eq!(feedback.state(), Some(Feedback::Neutral));
    }

    #[test]
    fn negative_reasons_are_joined_and_cleared() {
        let mut feedback = card();
        feedback.dislike();
        feedback.toggle_reason(Feedback::MissingCitation, true);
        feedback.toggle_reason(Feedback::OutOfScope, true);
        feedback.toggle_reason(Feedback::MissingCitation, true);
        feedback.toggle_reason(Feedback::InaccurateOrIrrelevant, true);
        feedback.toggle_reason(Feedback::OutOfScope, false);

        let effect = feedback.submit_reasons();
        assert_eq!(
            effect.submit.as_deref(),
            Some("missing_citation,inaccurate_or_irrelevant")
        );
        assert!(!feedback.is_dialog_open());
        assert!(feedback.reasons().is_empty());
    }

    #[test]
    fn dismissing_dialog_keeps_negative_state() {
        let mut feedback = AnswerFeedback::new(Some("a".to_string()), Some(Feedback::Positive));
        feedback.dislike();
        feedback.toggle_reason(Feedback::WrongCitation, true);
        feedback.dismiss_dialog();

        assert!(!feedback.is_dialog_open());
        assert_eq!(feedback.state(), Some(Feedback::Negative));
        assert_eq!(feedback.reasons(), &[Feedback::WrongCitation]);
    }

    #[test]
    fn cards_without_message_id_do_nothing() {
        let mut feedback = AnswerFeedback::new(None, None);
        assert!(feedback.like().is_empty());
        assert!(feedback.dislike().is_empty());
        assert!(feedback.submit_reasons().is_empty());
        assert_eq!(feedback.state(), None);
        assert!(!feedback.is_dialog_open());
    }
}
