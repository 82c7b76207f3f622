//! Sent by TMI to notify the client about something,
//! usually in response to invalid actions.

use super::{group, FromLine, MessageParseError};
use crate::common::Tags;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Sent by TMI for various reasons to notify the client about something,
/// usually in response to invalid actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
  channel: Option<String>,
  text: String,
  kind: Option<NoticeKind>,
}

generate_getters! {
  for Notice as self {
    /// Target channel name.
    ///
    /// This is [`None`] before a successful login.
    channel -> Option<&str> = self.channel.as_deref(),

    /// Notice message.
    text -> &str = self.text.as_ref(),

    /// Kind of the notice, decoded from the `msg-id` tag.
    ///
    /// This will only be [`None`] before a successful login.
    kind -> Option<&NoticeKind> = self.kind.as_ref(),
  }
}

impl FromLine for Notice {
  fn pattern() -> &'static Regex {
    pattern!(r"^(?:@(?P<tags>\S+)\s)?:tmi\.twitch\.tv\sNOTICE\s(?:#(?P<channel>\S+)|\*)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    Ok(Notice {
      channel: captures.name("channel").map(|m| m.as_str().to_owned()),
      text: group(captures, "text").into(),
      kind: tags.value("msg-id").map(NoticeKind::from_id),
    })
  }
}

impl_into_message!(Notice);

macro_rules! notice_kinds {
  ($($kind:ident => $id:literal),* $(,)?) => {
    /// Kind of a [`Notice`].
    ///
    /// See <https://dev.twitch.tv/docs/irc/msg-id/>.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub enum NoticeKind {
      $($kind,)*

      /// A `msg-id` which is not in the table.
      Other(String),
    }

    impl NoticeKind {
      /// The `msg-id` of this kind.
      pub fn as_str(&self) -> &str {
        match self {
          $(NoticeKind::$kind => $id,)*
          NoticeKind::Other(id) => id,
        }
      }
    }

    static BY_ID: LazyLock<HashMap<&'static str, NoticeKind>> =
      LazyLock::new(|| HashMap::from([$(($id, NoticeKind::$kind)),*]));
  };
}

impl NoticeKind {
  /// Look up the kind for a `msg-id`.
  pub fn from_id(id: &str) -> NoticeKind {
    BY_ID
      .get(id)
      .cloned()
      .unwrap_or_else(|| NoticeKind::Other(id.to_owned()))
  }
}

notice_kinds! {
  AlreadyBanned => "already_banned",
  AlreadyEmoteOnlyOff => "already_emote_only_off",
  AlreadyEmoteOnlyOn => "already_emote_only_on",
  AlreadyFollowersOff => "already_followers_off",
  AlreadyFollowersOn => "already_followers_on",
  AlreadyR9kOff => "already_r9k_off",
  AlreadyR9kOn => "already_r9k_on",
  AlreadySlowOff => "already_slow_off",
  AlreadySlowOn => "already_slow_on",
  AlreadySubsOff => "already_subs_off",
  AlreadySubsOn => "already_subs_on",
  AutohostReceive => "autohost_receive",
  BadBanAdmin => "bad_ban_admin",
  BadBanAnon => "bad_ban_anon",
  BadBanBroadcaster => "bad_ban_broadcaster",
  BadBanMod => "bad_ban_mod",
  BadBanSelf => "bad_ban_self",
  BadBanStaff => "bad_ban_staff",
  BadCommercialError => "bad_commercial_error",
  BadDeleteMessageBroadcaster => "bad_delete_message_broadcaster",
  BadDeleteMessageMod => "bad_delete_message_mod",
  BadHostError => "bad_host_error",
  BadHostHosting => "bad_host_hosting",
  BadHostRateExceeded => "bad_host_rate_exceeded",
  BadHostRejected => "bad_host_rejected",
  BadHostSelf => "bad_host_self",
  BadModBanned => "bad_mod_banned",
  BadModMod => "bad_mod_mod",
  BadSlowDuration => "bad_slow_duration",
  BadTimeoutAdmin => "bad_timeout_admin",
  BadTimeoutAnon => "bad_timeout_anon",
  BadTimeoutBroadcaster => "bad_timeout_broadcaster",
  BadTimeoutDuration => "bad_timeout_duration",
  BadTimeoutMod => "bad_timeout_mod",
  BadTimeoutSelf => "bad_timeout_self",
  BadTimeoutStaff => "bad_timeout_staff",
  BadUnbanNoBan => "bad_unban_no_ban",
  BadUnhostError => "bad_unhost_error",
  BadUnmodMod => "bad_unmod_mod",
  BadVipGranteeBanned => "bad_vip_grantee_banned",
  BadVipGranteeAlreadyVip => "bad_vip_grantee_already_vip",
  BadVipMaxVipsReached => "bad_vip_max_vips_reached",
  BadVipAchievementIncomplete => "bad_vip_achievement_incomplete",
  BadUnvipGranteeNotVip => "bad_unvip_grantee_not_vip",
  BanSuccess => "ban_success",
  CmdsAvailable => "cmds_available",
  ColorChanged => "color_changed",
  CommercialSuccess => "commercial_success",
  DeleteMessageSuccess => "delete_message_success",
  DeleteStaffMessageSuccess => "delete_staff_message_success",
  EmoteOnlyOff => "emote_only_off",
  EmoteOnlyOn => "emote_only_on",
  FollowersOff => "followers_off",
  FollowersOn => "followers_on",
  FollowersOnZero => "followers_on_zero",
  HostOff => "host_off",
  HostOn => "host_on",
  HostReceive => "host_receive",
  HostReceiveNoCount => "host_receive_no_count",
  HostTargetWentOffline => "host_target_went_offline",
  HostsRemaining => "hosts_remaining",
  InvalidUser => "invalid_user",
  ModSuccess => "mod_success",
  MsgBanned => "msg_banned",
  MsgBadCharacters => "msg_bad_characters",
  MsgChannelBlocked => "msg_channel_blocked",
  MsgChannelSuspended => "msg_channel_suspended",
  MsgDuplicate => "msg_duplicate",
  MsgEmoteonly => "msg_emoteonly",
  MsgFollowersonly => "msg_followersonly",
  MsgFollowersonlyFollowed => "msg_followersonly_followed",
  MsgFollowersonlyZero => "msg_followersonly_zero",
  MsgR9k => "msg_r9k",
  MsgRatelimit => "msg_ratelimit",
  MsgRejected => "msg_rejected",
  MessageRejectedMandatory => "message_rejected_mandatory",
  MessageSlowmode => "message_slowmode",
  MessageSubsonly => "message_subsonly",
  MsgSuspended => "msg_suspended",
  MsgTimedout => "msg_timedout",
  MsgVerifiedEmail => "msg_verified_email",
  NoHelp => "no_help",
  NoMods => "no_mods",
  NoVips => "no_vips",
  NotHosting => "not_hosting",
  NoPermission => "no_permission",
  R9kOff => "r9k_off",
  R9kOn => "r9k_on",
  RaidErrorAlreadyRaiding => "raid_error_already_raiding",
  RaidErrorForbidden => "raid_error_forbidden",
  RaidErrorSelf => "raid_error_self",
  RaidErrorTooManyViewers => "raid_error_too_many_viewers",
  RaidErrorUnexpected => "raid_error_unexpected",
  RaidNoticeMature => "raid_notice_mature",
  RaidNoticeRestrictedChat => "raid_notice_restricted_chat",
  RoomMods => "room_mods",
  SlowOff => "slow_off",
  SlowOn => "slow_on",
  SubsOff => "subs_off",
  SubsOn => "subs_on",
  TimeoutNoTimeout => "timeout_no_timeout",
  TimeoutSuccess => "timeout_success",
  TosBan => "tos_ban",
  TurboOnlyColor => "turbo_only_color",
  UnavailableCommand => "unavailable_command",
  UnbanSuccess => "unban_success",
  UnmodSuccess => "unmod_success",
  UnraidErrorNoActiveRaid => "unraid_error_no_active_raid",
  UnraidErrorUnexpected => "unraid_error_unexpected",
  UnraidSuccess => "unraid_success",
  UnrecognizedCmd => "unrecognized_cmd",
  UntimeoutBanned => "untimeout_banned",
  UntimeoutSuccess => "untimeout_success",
  UnvipSuccess => "unvip_success",
  UsageBan => "usage_ban",
  UsageClear => "usage_clear",
  UsageColor => "usage_color",
  UsageCommercial => "usage_commercial",
  UsageDisconnect => "usage_disconnect",
  UsageDelete => "usage_delete",
  UsageEmoteOnlyOff => "usage_emote_only_off",
  UsageEmoteOnlyOn => "usage_emote_only_on",
  UsageFollowersOff => "usage_followers_off",
  UsageFollowersOn => "usage_followers_on",
  UsageHelp => "usage_help",
  UsageHost => "usage_host",
  UsageMarker => "usage_marker",
  UsageMe => "usage_me",
  UsageMod => "usage_mod",
  UsageMods => "usage_mods",
  UsageR9kOff => "usage_r9k_off",
  UsageR9kOn => "usage_r9k_on",
  UsageRaid => "usage_raid",
  UsageSlowOff => "usage_slow_off",
  UsageSlowOn => "usage_slow_on",
  UsageSubsOff => "usage_subs_off",
  UsageSubsOn => "usage_subs_on",
  UsageTimeout => "usage_timeout",
  UsageUnban => "usage_unban",
  UsageUnhost => "usage_unhost",
  UsageUnmod => "usage_unmod",
  UsageUnraid => "usage_unraid",
  UsageUntimeout => "usage_untimeout",
  UsageUnvip => "usage_unvip",
  UsageUser => "usage_user",
  UsageVip => "usage_vip",
  UsageVips => "usage_vips",
  UsageWhisper => "usage_whisper",
  VipSuccess => "vip_success",
  VipsSuccess => "vips_success",
  WhisperBanned => "whisper_banned",
  WhisperBannedRecipient => "whisper_banned_recipient",
  WhisperInvalidLogin => "whisper_invalid_login",
  WhisperInvalidSelf => "whisper_invalid_self",
  WhisperLimitPerMin => "whisper_limit_per_min",
  WhisperLimitPerSec => "whisper_limit_per_sec",
  WhisperRestricted => "whisper_restricted",
  WhisperRestrictedRecipient => "whisper_restricted_recipient",
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_notice_host_on() {
    let notice = decode!(Notice, "@msg-id=host_on :tmi.twitch.tv NOTICE #wtii :Now hosting sp4rta.");
    assert_eq!(notice.channel(), Some("wtii"));
    assert_eq!(notice.text(), "Now hosting sp4rta.");
    assert_eq!(notice.kind(), Some(&NoticeKind::HostOn));
  }

  #[test]
  fn parse_notice_host_target_went_offline() {
    let notice = decode!(
      Notice,
      "@msg-id=host_target_went_offline :tmi.twitch.tv NOTICE #wtii :sp4rta has gone offline. Exiting host mode."
    );
    assert_eq!(notice.kind(), Some(&NoticeKind::HostTargetWentOffline));
  }

  #[test]
  fn parse_notice_before_login() {
    let notice = decode!(Notice, ":tmi.twitch.tv NOTICE * :Login authentication failed");
    assert_eq!(notice.channel(), None);
    assert_eq!(notice.kind(), None);
    assert_eq!(notice.text(), "Login authentication failed");
  }

  #[test]
  fn parse_notice_unknown_kind() {
    let notice = decode!(Notice, "@msg-id=brand_new_thing :tmi.twitch.tv NOTICE #wtii :hi");
    assert_eq!(notice.kind(), Some(&NoticeKind::Other("brand_new_thing".into())));
  }

  #[test]
  fn kind_table_is_bidirectional() {
    for kind in BY_ID.values() {
      assert_eq!(&NoticeKind::from_id(kind.as_str()), kind);
    }
    assert_eq!(NoticeKind::MsgRatelimit.as_str(), "msg_ratelimit");
    assert_eq!(
      NoticeKind::from_id("whisper_restricted_recipient"),
      NoticeKind::WhisperRestrictedRecipient
    );
  }
}
