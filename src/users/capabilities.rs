use uuid::Uuid;

use super::model::User;

/// Something an authentication layer can log in and remember.
pub trait Authenticatable {
    fn auth_identifier_name(&self) -> &'static str {
        "id"
    }
    fn auth_identifier(&self) -> Uuid;
    fn auth_password(&self) -> Option<&str>;
    fn remember_token(&self) -> Option<&str>;
    fn set_remember_token(&mut self, token: Option<String>);
    fn remember_token_name(&self) -> &'static str {
        "remember_token"
    }
}

/// Something notifications can be delivered to.
pub trait Notifiable {
    /// Address for the given channel, `None` when the channel is not routable.
    fn route_notification_for(&self, channel: &str) -> Option<String>;
}

impl Authenticatable for User {
    fn auth_identifier(&self) -> Uuid {
        self.id
    }

    fn auth_password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    fn remember_token(&self) -> Option<&str> {
        self.remember_token.as_deref()
    }

    fn set_remember_token(&mut self, token: Option<String>) {
        self.remember_token = token;
    }
}

impl Notifiable for User {
    fn route_notification_for(&self, channel: &str) -> Option<String> {
        match channel {
            "mail" if !self.email.is_empty() => Some(self.email.clone()),
            _ => None,
        }
    }
}
