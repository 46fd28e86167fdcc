//! Passive record shapes returned by the API.
//!
//! Every field is optional from the decoder's point of view: the remote only
//! returns what the field selection asked for, so each struct is
//! `#[serde(default)]` and unknown fields are ignored. Only a value of the
//! wrong JSON type makes a record fail to decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Record;
use crate::{ReleaseDate, ReleaseStatus, Timestamp, VndbId};

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

/// Image metadata attached to visual novels, releases, and characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: Option<String>,
    pub url: Option<String>,
    /// `[width, height]` in pixels.
    pub dims: Option<(u32, u32)>,
    pub sexual: Option<f64>,
    pub violence: Option<f64>,
    pub votecount: Option<u32>,
    pub thumbnail: Option<String>,
    pub thumbnail_dims: Option<(u32, u32)>,
}

/// A link to an external site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extlink {
    pub url: String,
    pub label: String,
    pub name: String,
    pub id: Option<Value>,
}

/// A title in one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Title {
    pub lang: String,
    pub title: String,
    pub latin: Option<String>,
    pub official: bool,
    pub main: bool,
}

/// Reference to a producer from another record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerRef {
    pub id: VndbId,
    pub name: Option<String>,
    pub original: Option<String>,
}

// ---------------------------------------------------------------------------
// Database entries
// ---------------------------------------------------------------------------

/// A tag applied to a visual novel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnTag {
    pub id: VndbId,
    pub rating: Option<f64>,
    pub spoiler: u8,
    pub lie: bool,
    pub name: Option<String>,
    pub category: Option<String>,
}

/// A visual novel (`/vn`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vn {
    pub id: VndbId,
    pub title: Option<String>,
    pub alttitle: Option<String>,
    pub titles: Vec<Title>,
    pub aliases: Vec<String>,
    pub olang: Option<String>,
    /// 0 finished, 1 in development, 2 cancelled.
    pub devstatus: Option<u8>,
    pub released: Option<ReleaseDate>,
    pub languages: Vec<String>,
    pub platforms: Vec<String>,
    pub image: Option<Image>,
    pub length: Option<u8>,
    pub length_minutes: Option<u32>,
    pub length_votes: Option<u32>,
    pub description: Option<String>,
    pub average: Option<f64>,
    pub rating: Option<f64>,
    pub votecount: Option<u32>,
    pub screenshots: Vec<Image>,
    pub tags: Vec<VnTag>,
    pub developers: Vec<ProducerRef>,
    pub extlinks: Vec<Extlink>,
}

/// A release (`/release`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub id: VndbId,
    pub title: Option<String>,
    pub alttitle: Option<String>,
    pub platforms: Vec<String>,
    pub media: Vec<ReleaseMedia>,
    pub vns: Vec<ReleaseVn>,
    pub producers: Vec<ReleaseProducer>,
    pub released: Option<ReleaseDate>,
    pub minage: Option<u8>,
    pub patch: bool,
    pub freeware: bool,
    pub uncensored: Option<bool>,
    pub official: bool,
    pub has_ero: bool,
    pub resolution: Option<Value>,
    pub engine: Option<String>,
    pub voiced: Option<u8>,
    pub notes: Option<String>,
    pub gtin: Option<String>,
    pub catalog: Option<String>,
    pub extlinks: Vec<Extlink>,
}

/// Physical or digital media of a release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseMedia {
    pub medium: String,
    pub qty: u32,
}

/// A visual novel linked from a release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseVn {
    pub id: VndbId,
    /// `"trial"`, `"partial"`, or `"complete"`.
    pub rtype: Option<String>,
    pub title: Option<String>,
}

/// A producer linked from a release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseProducer {
    pub id: VndbId,
    pub developer: bool,
    pub publisher: bool,
    pub name: Option<String>,
}

/// A producer (`/producer`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Producer {
    pub id: VndbId,
    pub name: Option<String>,
    pub original: Option<String>,
    pub aliases: Vec<String>,
    pub lang: Option<String>,
    /// `"co"` company, `"in"` individual, `"ng"` amateur group.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub extlinks: Vec<Extlink>,
}

/// A character (`/character`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub id: VndbId,
    pub name: Option<String>,
    pub original: Option<String>,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub image: Option<Image>,
    pub blood_type: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub bust: Option<u32>,
    pub waist: Option<u32>,
    pub hips: Option<u32>,
    pub cup: Option<String>,
    pub age: Option<u32>,
    /// `[month, day]`.
    pub birthday: Option<(u8, u8)>,
    /// `[apparent, spoiler]`.
    pub sex: Option<(Option<String>, Option<String>)>,
    pub gender: Option<(Option<String>, Option<String>)>,
    pub vns: Vec<CharacterVn>,
    pub traits: Vec<CharacterTrait>,
}

/// A visual novel a character appears in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterVn {
    pub id: VndbId,
    pub spoiler: u8,
    /// `"main"`, `"primary"`, `"side"`, or `"appears"`.
    pub role: Option<String>,
    pub title: Option<String>,
    pub release: Option<ReleaseVn>,
}

/// A trait of a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTrait {
    pub id: VndbId,
    pub spoiler: u8,
    pub lie: bool,
    pub name: Option<String>,
    pub group_name: Option<String>,
}

/// A staff member (`/staff`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Staff {
    pub id: VndbId,
    pub aid: Option<u64>,
    pub ismain: bool,
    pub name: Option<String>,
    pub original: Option<String>,
    pub lang: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub extlinks: Vec<Extlink>,
    pub aliases: Vec<StaffAlias>,
}

/// An alias of a staff member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffAlias {
    pub aid: u64,
    pub name: String,
    pub latin: Option<String>,
    pub ismain: bool,
}

/// A tag (`/tag`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: VndbId,
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    /// `"cont"`, `"ero"`, or `"tech"`.
    pub category: Option<String>,
    pub searchable: bool,
    pub applicable: bool,
    pub vn_count: Option<u64>,
}

/// A character trait (`/trait`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trait {
    pub id: VndbId,
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub searchable: bool,
    pub applicable: bool,
    pub sexual: bool,
    pub group_id: Option<VndbId>,
    pub group_name: Option<String>,
    pub char_count: Option<u64>,
}

/// A quote (`/quote`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub id: VndbId,
    pub quote: Option<String>,
    pub score: Option<i64>,
    pub vn: Option<QuoteVn>,
    pub character: Option<QuoteCharacter>,
}

/// The visual novel a quote is from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteVn {
    pub id: VndbId,
    pub title: Option<String>,
}

/// The character who said a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteCharacter {
    pub id: VndbId,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// User lists
// ---------------------------------------------------------------------------

/// A visual novel on a user's list (`/ulist`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UlistItem {
    /// Visual novel identifier.
    pub id: VndbId,
    /// Unix timestamp when the entry was added.
    pub added: Option<i64>,
    pub voted: Option<i64>,
    pub lastmod: Option<i64>,
    /// 10–100.
    pub vote: Option<u8>,
    pub started: Option<ReleaseDate>,
    pub finished: Option<ReleaseDate>,
    pub notes: Option<String>,
    pub labels: Vec<UlistLabelRef>,
    /// Selected fields of the visual novel itself.
    pub vn: Option<Value>,
    pub releases: Vec<UlistRelease>,
}

impl UlistItem {
    /// When the entry was added.
    pub fn added_at(&self) -> Option<Timestamp> {
        self.added.and_then(Timestamp::from_unix)
    }

    /// When the entry was last modified.
    pub fn modified_at(&self) -> Option<Timestamp> {
        self.lastmod.and_then(Timestamp::from_unix)
    }
}

/// A label attached to a list entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UlistLabelRef {
    pub id: u32,
    pub label: Option<String>,
}

/// A release of a listed visual novel that is on the user's release list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UlistRelease {
    pub id: VndbId,
    pub list_status: Option<ReleaseStatus>,
    pub title: Option<String>,
}

/// A label definition (`/ulist_labels`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UlistLabel {
    pub id: u32,
    pub label: String,
    pub private: bool,
    pub count: Option<u64>,
}

// ---------------------------------------------------------------------------
// Single-object resources
// ---------------------------------------------------------------------------

/// A user, as returned by `/user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: VndbId,
    pub username: String,
    pub lengthvotes: Option<u64>,
    pub lengthvotes_sum: Option<u64>,
}

/// The owner and permissions of the current token (`/authinfo`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthInfo {
    pub id: VndbId,
    pub username: String,
    /// e.g. `"listread"`, `"listwrite"`.
    pub permissions: Vec<String>,
}

impl AuthInfo {
    /// Returns `true` if the token grants `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Database-wide counts (`/stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub chars: u64,
    pub producers: u64,
    pub releases: u64,
    pub staff: u64,
    pub tags: u64,
    pub traits: u64,
    pub vn: u64,
}

// ---------------------------------------------------------------------------
// Endpoint bindings
// ---------------------------------------------------------------------------

impl Record for Vn {
    const ENDPOINT: &'static str = "/vn";
}

impl Record for Release {
    const ENDPOINT: &'static str = "/release";
}

impl Record for Producer {
    const ENDPOINT: &'static str = "/producer";
}

impl Record for Character {
    const ENDPOINT: &'static str = "/character";
}

impl Record for Staff {
    const ENDPOINT: &'static str = "/staff";
}

impl Record for Tag {
    const ENDPOINT: &'static str = "/tag";
}

impl Record for Trait {
    const ENDPOINT: &'static str = "/trait";
}

impl Record for Quote {
    const ENDPOINT: &'static str = "/quote";
}

impl Record for UlistItem {
    const ENDPOINT: &'static str = "/ulist";
}
