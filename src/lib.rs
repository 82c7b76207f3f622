#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

pub(crate) const fn assert_sync<T: ?Sized + Sync>() {}
macro_rules! static_assert_sync {
  ($T:ty) => {
    const _: () = {
      let _ = $crate::assert_sync::<$T>;
    };
  };
}

pub(crate) const fn assert_send<T: ?Sized + Send>() {}
macro_rules! static_assert_send {
  ($T:ty) => {
    const _: () = {
      let _ = $crate::assert_send::<$T>;
    };
  };
}

pub mod common;

pub mod msg;
pub use msg::*;

pub mod client;
pub use client::{Client, Credentials};

pub mod command;
pub use command::CommandDetail;

pub mod expand;

pub mod builtin;

pub mod store;

pub mod cache;

pub mod config;

pub mod bot;
pub use bot::{Bot, BotError, Context};
