//! Mediagraph Services Layer
//!
//! Clients for services that sit downstream of the upload workflow. The only
//! one today is the thumbnail processor, reached through `NotificationClient`.

pub mod notification;

pub use notification::{
    create_notification_client, HttpNotificationClient, NotificationClient, NotificationError,
    ProcessingRequest,
};
