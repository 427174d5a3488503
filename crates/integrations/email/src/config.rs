use serde::{Deserialize, Serialize};

/// SMTP-specific configuration settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub smtp_host: String,
    /// Defaults to 587 (STARTTLS submission port).
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Whether to use TLS. Defaults to `true`.
    pub tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_owned(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
        }
    }
}

/// Full email channel configuration.
///
/// # Examples
///
/// ```
/// use taskwire_email::EmailConfig;
///
/// let config = EmailConfig::new("smtp.example.com", "noreply@example.com");
/// assert_eq!(config.smtp_host(), Some("smtp.example.com"));
/// assert!(config.tls());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// The `From` address used in outgoing emails.
    pub from_address: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_tls")]
    pub tls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_tls() -> bool {
    true
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("from_address", &self.from_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl EmailConfig {
    pub fn new(smtp_host: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            smtp_host: smtp_host.into(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            username: self.username.clone(),
            password: self.password.clone(),
            tls: self.tls,
        }
    }

    pub fn smtp_host(&self) -> Option<&str> {
        if self.smtp_host.is_empty() {
            None
        } else {
            Some(&self.smtp_host)
        }
    }

    pub fn tls(&self) -> bool {
        self.tls
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: "noreply@localhost".to_owned(),
            smtp_host: "localhost".to_owned(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
        }
    }
}
