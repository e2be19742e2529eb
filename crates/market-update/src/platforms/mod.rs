//! Messaging platform clients

pub mod slack;

pub use slack::{
    Block, MessagingProvider, PostMessage, PostMessageResponse, SlackClient, TextObject,
};

#[cfg(test)]
pub use slack::MockMessagingProvider;
