use askama::Template;
use askama_web::WebTemplate;

use crate::records::{Complaint, Message};
use crate::stats::{CategoryCount, StatusCount};

/// The notification surface: handlers hand views a title, a description and
/// a severity; nothing here is persisted or logged.
pub(crate) struct Toast {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) severity: Severity,
}

pub(crate) enum Severity {
    Success,
    Error,
}

impl Severity {
    pub(crate) fn css_class(&self) -> &'static str {
        match self {
            Severity::Success => "toast-success",
            Severity::Error => "toast-error",
        }
    }
}

impl Toast {
    pub(crate) fn success(title: &str, description: String) -> Self {
        Self {
            title: title.to_string(),
            description,
            severity: Severity::Success,
        }
    }

    pub(crate) fn error(title: &str, description: String) -> Self {
        Self {
            title: title.to_string(),
            description,
            severity: Severity::Error,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub(crate) struct LandingTemplate {
    pub(crate) app_name: String,
}

/// One parameterized template for both the sign-in and sign-up variants of
/// the user gate.
#[derive(Template, WebTemplate)]
#[template(path = "user_login.html")]
pub(crate) struct UserLoginTemplate {
    pub(crate) app_name: String,
    pub(crate) signup: bool,
    pub(crate) error: String,
    pub(crate) notice: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_login.html")]
pub(crate) struct AdminLoginTemplate {
    pub(crate) app_name: String,
    pub(crate) error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "user_dashboard.html")]
pub(crate) struct UserDashboardTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) complaints: Vec<Complaint>,
}

#[derive(Template, WebTemplate)]
#[template(path = "complaint_form.html")]
pub(crate) struct ComplaintFormTemplate {
    pub(crate) app_name: String,
    pub(crate) user_name: String,
    pub(crate) categories: &'static [&'static str],
    pub(crate) error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "complaint_success.html")]
pub(crate) struct ComplaintSuccessTemplate {
    pub(crate) app_name: String,
    pub(crate) short_id: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "user_conversations.html")]
pub(crate) struct UserConversationsTemplate {
    pub(crate) app_name: String,
    pub(crate) complaints: Vec<Complaint>,
}

#[derive(Template, WebTemplate)]
#[template(path = "user_conversation.html")]
pub(crate) struct UserConversationTemplate {
    pub(crate) app_name: String,
    pub(crate) complaint: Complaint,
    pub(crate) messages: Vec<Message>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_dashboard.html")]
pub(crate) struct AdminDashboardTemplate {
    pub(crate) app_name: String,
    pub(crate) total: usize,
    pub(crate) status_counts: Vec<StatusCount>,
    pub(crate) category_counts: Vec<CategoryCount>,
    pub(crate) recent: Vec<Complaint>,
    pub(crate) toast: Option<Toast>,
}

pub(crate) struct ConversationEntry {
    pub(crate) complaint: Complaint,
    pub(crate) unread: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_conversations.html")]
pub(crate) struct AdminConversationsTemplate {
    pub(crate) app_name: String,
    pub(crate) entries: Vec<ConversationEntry>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_conversation.html")]
pub(crate) struct AdminConversationTemplate {
    pub(crate) app_name: String,
    pub(crate) complaint: Complaint,
    pub(crate) messages: Vec<Message>,
    pub(crate) revision: u64,
    pub(crate) toast: Option<Toast>,
}
