//! A user notice is sent when some [`Event`] occurs.

use super::{
  group, parse_badges, parse_color, parse_emotes, parse_timestamp, FromLine, MessageParseError,
  User, UserType,
};
use crate::common::badges::badge;
use crate::common::{Badges, Emote, Tags};
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::str::FromStr;
use uuid::Uuid;

/// A user notice is sent when some [`Event`] occurs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserNotice {
  channel: String,
  room_id: u64,
  message_id: Uuid,
  sender: User,
  text: Option<String>,
  system_message: String,
  event: Event,
  badges: Badges,
  badge_info: Badges,
  color: Option<String>,
  emotes: Vec<Emote>,
  subscriber: bool,
  turbo: bool,
  timestamp: DateTime<Utc>,
}

generate_getters! {
  for UserNotice as self {
    /// Name of the channel which received this user notice.
    channel -> &str = self.channel.as_ref(),

    /// ID of the channel which received this user notice.
    room_id -> u64,

    /// Unique ID of the message.
    message_id -> Uuid,

    /// Origin of the user notice.
    sender -> &User = &self.sender,

    /// Optional message sent along with the user notice.
    text -> Option<&str> = self.text.as_deref(),

    /// Message generated by Twitch describing the event.
    system_message -> &str = self.system_message.as_ref(),

    /// Event-specific information.
    event -> &Event = &self.event,

    /// The channel badges enabled by the user in the [channel][`UserNotice::channel`].
    badges -> &Badges = &self.badges,

    /// Extra info about the badges.
    badge_info -> &Badges = &self.badge_info,

    /// The user's selected name color.
    color -> Option<&str> = self.color.as_deref(),

    /// Emotes present in [`UserNotice::text`].
    emotes -> &[Emote] = &self.emotes,

    subscriber -> bool,

    turbo -> bool,

    /// The time at which the notice was sent.
    timestamp -> DateTime<Utc>,
  }
}

impl UserNotice {
  /// Whether the sender wears the moderator badge, or has the moderator user type.
  pub fn is_moderator(&self) -> bool {
    self.badges.contains(badge::MODERATOR) || self.sender.kind() == UserType::Moderator
  }
}

/// Event-specific information, keyed by the `msg-id` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
  /// User subscribes or resubscribes to a channel.
  /// They are paying for their own subscription.
  SubOrResub(SubOrResub),

  /// A user is gifting a subscription to a specific user.
  SubGift(SubGift),

  /// A user continues the subscription they were gifted by a named user.
  GiftPaidUpgrade(GiftPaidUpgrade),

  /// A user continues the subscription they were gifted by an anonymous user.
  AnonGiftPaidUpgrade(AnonGiftPaidUpgrade),

  /// The channel has been raided.
  Raid(Raid),

  /// Rituals are automated actions.
  ///
  /// For example, the `new_chatter` ritual would consist of every chatter
  /// receiving the message:
  ///
  /// `$USER is new to $CHANNEL's chat! Say hello!`
  Ritual(Ritual),

  /// A user has earned a new bits badge tier.
  BitsBadgeTier(BitsBadgeTier),

  /// An event which is not decoded, identified by its `msg-id`.
  Other(String),
}

/// Subscription tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubPlan {
  Prime,
  Tier1,
  Tier2,
  Tier3,
}

impl SubPlan {
  pub fn as_str(&self) -> &'static str {
    match self {
      SubPlan::Prime => "Prime",
      SubPlan::Tier1 => "1000",
      SubPlan::Tier2 => "2000",
      SubPlan::Tier3 => "3000",
    }
  }
}

impl FromStr for SubPlan {
  type Err = UnknownSubPlan;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "Prime" => SubPlan::Prime,
      "1000" => SubPlan::Tier1,
      "2000" => SubPlan::Tier2,
      "3000" => SubPlan::Tier3,
      _ => return Err(UnknownSubPlan),
    })
  }
}

#[derive(Clone, Copy, Debug)]
pub struct UnknownSubPlan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubOrResub {
  is_resub: bool,
  cumulative_months: u64,
  should_share_streak: bool,
  streak_months: u64,
  plan: SubPlan,
  plan_name: String,
}

generate_getters! {
  for SubOrResub as self {
    /// If `false`, then this the user's first subscription in this channel.
    is_resub -> bool,

    /// Cumulative number of months the user has subscribed to this channel.
    cumulative_months -> u64,

    /// Whether the user agreed to share their streak.
    should_share_streak -> bool,

    /// Consecutive number of months the user has subscribed to this channel.
    ///
    /// Defaults to `1` when not sent.
    streak_months -> u64,

    plan -> SubPlan,

    /// Name of the subscription plan, e.g. `Channel Subscription (WTii)`.
    plan_name -> &str = self.plan_name.as_ref(),
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubGift {
  months: u64,
  recipient: User,
  plan: SubPlan,
  plan_name: String,
  gift_months: u64,
}

generate_getters! {
  for SubGift as self {
    /// Cumulative number of months the recipient has subscribed to this channel.
    months -> u64,

    /// The user receiving the gift.
    recipient -> &User = &self.recipient,

    plan -> SubPlan,

    plan_name -> &str = self.plan_name.as_ref(),

    /// Number of months gifted, defaults to `1` when not sent.
    gift_months -> u64,
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiftPaidUpgrade {
  total_gifted: u64,
  promo_name: String,
  gifter_login: String,
  gifter_name: String,
}

generate_getters! {
  for GiftPaidUpgrade as self {
    /// Number of gifts the gifter has given during the promo.
    total_gifted -> u64,

    promo_name -> &str = self.promo_name.as_ref(),

    gifter_login -> &str = self.gifter_login.as_ref(),

    gifter_name -> &str = self.gifter_name.as_ref(),
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnonGiftPaidUpgrade {
  total_gifted: u64,
  promo_name: String,
}

generate_getters! {
  for AnonGiftPaidUpgrade as self {
    total_gifted -> u64,
    promo_name -> &str = self.promo_name.as_ref(),
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raid {
  raider_name: String,
  raider_login: String,
  viewer_count: u64,
}

generate_getters! {
  for Raid as self {
    /// Display name of the raiding channel.
    raider_name -> &str = self.raider_name.as_ref(),

    /// Login of the raiding channel.
    raider_login -> &str = self.raider_login.as_ref(),

    /// Number of viewers which joined in on the raid.
    viewer_count -> u64,
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ritual {
  name: String,
}

generate_getters! {
  for Ritual as self {
    /// Name of the ritual, e.g. `new_chatter`.
    name -> &str = self.name.as_ref(),
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitsBadgeTier {
  threshold: u64,
}

generate_getters! {
  for BitsBadgeTier as self {
    /// Tier of the bits badge the user just earned, e.g. `100`, `1000`, `10000`, etc.
    threshold -> u64,
  }
}

impl Event {
  fn parse(tags: &Tags) -> Result<Event, MessageParseError> {
    let kind = tags.require("msg-id")?;
    Ok(match kind {
      "sub" | "resub" => Event::SubOrResub(SubOrResub {
        is_resub: kind == "resub",
        cumulative_months: tags.parse_required("msg-param-cumulative-months")?,
        should_share_streak: tags.flag("msg-param-should-share-streak"),
        streak_months: tags.parse_opt("msg-param-streak-months")?.unwrap_or(1),
        plan: tags.parse_required("msg-param-sub-plan")?,
        plan_name: tags.require("msg-param-sub-plan-name")?.into(),
      }),
      "subgift" => Event::SubGift(SubGift {
        months: tags.parse_required("msg-param-months")?,
        recipient: User {
          id: tags.parse_required("msg-param-recipient-id")?,
          login: tags.require("msg-param-recipient-user-name")?.into(),
          name: tags.require("msg-param-recipient-display-name")?.into(),
          kind: UserType::Normal,
        },
        plan: tags.parse_required("msg-param-sub-plan")?,
        plan_name: tags.require("msg-param-sub-plan-name")?.into(),
        gift_months: tags.parse_opt("msg-param-gift-months")?.unwrap_or(1),
      }),
      "giftpaidupgrade" => Event::GiftPaidUpgrade(GiftPaidUpgrade {
        total_gifted: tags.parse_required("msg-param-promo-gift-total")?,
        promo_name: tags.require("msg-param-promo-name")?.into(),
        gifter_login: tags.require("msg-param-sender-login")?.into(),
        gifter_name: tags.require("msg-param-sender-name")?.into(),
      }),
      "anongiftpaidupgrade" => Event::AnonGiftPaidUpgrade(AnonGiftPaidUpgrade {
        total_gifted: tags.parse_required("msg-param-promo-gift-total")?,
        promo_name: tags.require("msg-param-promo-name")?.into(),
      }),
      "raid" => Event::Raid(Raid {
        raider_name: tags.require("msg-param-displayName")?.into(),
        raider_login: tags.require("msg-param-login")?.into(),
        viewer_count: tags.parse_required("msg-param-viewerCount")?,
      }),
      "ritual" => Event::Ritual(Ritual {
        name: tags.require("msg-param-ritual-name")?.into(),
      }),
      "bitsbadgetier" => Event::BitsBadgeTier(BitsBadgeTier {
        threshold: tags.parse_required("msg-param-threshold")?,
      }),
      other => Event::Other(other.into()),
    })
  }
}

impl FromLine for UserNotice {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sUSERNOTICE\s#(?P<channel>\S+)(?:\s:(?P<text>.*))?$")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));

    Ok(UserNotice {
      channel: group(captures, "channel").into(),
      room_id: tags.parse_required("room-id")?,
      message_id: tags.parse_required("id")?,
      sender: User {
        id: tags.parse_required("user-id")?,
        login: tags.require("login")?.into(),
        name: tags.require("display-name")?.into(),
        kind: tags.parse_opt("user-type")?.unwrap_or_default(),
      },
      text: captures.name("text").map(|m| m.as_str().to_owned()),
      system_message: tags.require("system-msg")?.into(),
      event: Event::parse(&tags)?,
      badges: parse_badges(&tags, "badges"),
      badge_info: parse_badges(&tags, "badge-info"),
      color: parse_color(&tags),
      emotes: parse_emotes(&tags)?,
      subscriber: tags.flag("subscriber"),
      turbo: tags.flag("turbo"),
      timestamp: parse_timestamp(&tags, "tmi-sent-ts")?,
    })
  }
}

impl_into_message!(UserNotice);
