use std::sync::Arc;

use crate::gateway::DataGateway;
use crate::model::{Feedback, NewFeedback};
use crate::view::notice::{Notice, Notices};

pub struct FeedbackView<G: ?Sized> {
    gateway: Arc<G>,
    approved: Vec<Feedback>,
    notices: Notices,
}

impl<G: DataGateway + ?Sized> FeedbackView<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            approved: Vec::new(),
            notices: Notices::new("feedback"),
        }
    }

    pub fn approved(&self) -> &[Feedback] {
        &self.approved
    }

    /// Mean rating of the approved entries.
    pub fn average_rating(&self) -> Option<f64> {
        if self.approved.is_empty() {
            return None;
        }
        let sum: u32 = self.approved.iter().map(|entry| entry.rating as u32).sum();
        Some(sum as f64 / self.approved.len() as f64)
    }

    pub async fn load(&mut self) -> bool {
        match self.gateway.list_approved_feedback().await {
            Ok(approved) => {
                self.approved = approved;
                true
            }
            Err(err) => {
                self.notices.failure("load feedback", &err);
                false
            }
        }
    }

    pub async fn submit(&mut self, form: NewFeedback) -> bool {
        if !form.is_submittable() {
            return false;
        }
        match self.gateway.submit_feedback(form).await {
            Ok(_) => {
                self.notices.success("Thanks for the feedback!");
                true
            }
            Err(err) => {
                self.notices.failure("send feedback", &err);
                false
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, Session, SessionStore};
    use uuid::Uuid;

    #[tokio::test]
    async fn submitted_feedback_waits_for_approval() {
        let gateway = Arc::new(MemoryGateway::new(SessionStore::signed_in(Session::new(
            Uuid::new_v4(),
            "token",
        ))));
        let mut view = FeedbackView::new(gateway.clone());

        assert!(view.submit(NewFeedback::new(4, "needs dark mode")).await);
        assert!(!view.submit(NewFeedback::new(9, "broken")).await);
        view.load().await;
        assert!(view.approved().is_empty());
        assert_eq!(view.average_rating(), None);

        let pending = gateway.submit_feedback(NewFeedback::new(2, "ok")).await.unwrap();
        gateway.approve_feedback(pending.id);
        view.load().await;
        assert_eq!(view.average_rating(), Some(2.0));
    }
}
