#![doc = include_str!("../README.md")]

#[cfg(feature = "client")]
pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;
pub mod validation;

// Re-exports for convenient access
#[cfg(feature = "client")]
pub use api::{ApiClient, BankClient};
pub use config::{ClientConfig, Environment, StorageKeys};
pub use envelope::ApiResponse;
pub use error::Error;
pub use session::{AuthApi, Credentials, LoginResponse, Session, SessionStore, TokenProvider};
pub use storage::{FileStorage, MemoryStorage, NoopStorage, Storage, StorageExt};
pub use token::{TokenClaims, decode_claims, is_expired};
pub use types::{
    AccountSummary, Amount, DeviceId, Ifsc, KycStatus, MobileNumber, Mpin, Otp, User, UserId,
};
pub use validation::{
    check_transfer_amount, is_valid_ifsc, is_valid_mobile_number, is_valid_mpin, is_valid_otp,
};
