use serde::{Deserialize, Serialize};

/// A notification receiver profile.
///
/// Contact addresses are optional; a dispatcher that cannot resolve the
/// address it needs logs a warning and skips the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number in E.164 form, used by sms and whatsapp
    #[serde(default)]
    pub phone: Option<String>,
    /// Telegram chat id, obtained when the user connects the bot
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    /// Device tokens for push delivery
    #[serde(default)]
    pub push_tokens: Vec<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Recipient {
    /// Creates a bare recipient with only a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            phone: None,
            telegram_chat_id: None,
            push_tokens: Vec::new(),
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_telegram_chat_id(mut self, chat_id: i64) -> Self {
        self.telegram_chat_id = Some(chat_id);
        self
    }

    pub fn with_push_token(mut self, token: impl Into<String>) -> Self {
        self.push_tokens.push(token.into());
        self
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}
