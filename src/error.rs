use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Amount must be a number greater than zero")]
    InvalidAmount,
    #[error("A valid e-mail address is required")]
    MissingEmail,
    #[error("Return URL must be an absolute http(s) URL")]
    InvalidReturnUrl,
    #[error("Invalid payment id")]
    InvalidPaymentId,
    #[error("{collaborator} is not configured")]
    NotConfigured { collaborator: &'static str },
    #[error("Gateway error: {message}")]
    Gateway { message: String },
    #[error("Notification failed: {0}")]
    NotificationFailure(String),
}

impl PaymentError {
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input, detected before any provider call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount | Self::MissingEmail | Self::InvalidReturnUrl | Self::InvalidPaymentId
        )
    }

    /// The provider-facing description, if this error carries one.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Gateway { message } => Some(message.clone()),
            Self::NotificationFailure(message) => Some(message.clone()),
            Self::NotConfigured { .. } => Some(self.to_string()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
