use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Display;
use sos_protocol::{MyRank, RankEntry};

/// Rows per page of the standings table.
pub const RANKS_PER_PAGE: usize = 10;

/// Client-side view of the ranking service.
///
/// Failed refreshes keep the last data that was received and mark it stale.
/// Hidden messages are only held while the player is in first place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<RankEntry>,
    my_rank: Option<MyRank>,
    hidden_messages: Option<Vec<String>>,
    stale: bool,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn my_rank(&self) -> Option<&MyRank> {
        self.my_rank.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns whether the standings were replaced.
    pub fn apply_standings<E: Display>(
        &mut self,
        result: core::result::Result<Vec<RankEntry>, E>,
    ) -> bool {
        match result {
            Ok(mut entries) => {
                entries.sort_by_key(|entry| entry.rank);
                self.entries = entries;
                self.stale = false;
                true
            }
            Err(err) => {
                log::warn!("Keeping {} stale standings: {}", self.entries.len(), err);
                self.stale = true;
                false
            }
        }
    }

    /// Returns whether the player's rank was replaced.
    pub fn apply_my_rank<E: Display>(&mut self, result: core::result::Result<MyRank, E>) -> bool {
        match result {
            Ok(mine) => {
                self.my_rank = Some(mine);
                if !self.is_champion() && self.hidden_messages.take().is_some() {
                    log::debug!("Lost first place, dropping hidden messages");
                }
                true
            }
            Err(err) => {
                log::warn!("Keeping last known rank: {}", err);
                self.stale = true;
                false
            }
        }
    }

    /// First place may read the hidden messages.
    pub fn is_champion(&self) -> bool {
        self.my_rank.as_ref().is_some_and(|mine| mine.rank == 1)
    }

    /// Stores the messages fetched for first place. Ignored for anyone else.
    pub fn apply_hidden_messages(&mut self, messages: Vec<String>) {
        if self.is_champion() {
            self.hidden_messages = Some(messages);
        }
    }

    /// Messages for first place, `None` unless the player currently holds it.
    pub fn hidden_messages(&self) -> Option<&[String]> {
        self.hidden_messages.as_deref().filter(|_| self.is_champion())
    }

    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(RANKS_PER_PAGE).max(1)
    }

    /// Entries of one page, pages counted from 1. Out of range pages are empty.
    pub fn page(&self, page: usize) -> &[RankEntry] {
        let start = page.saturating_sub(1).saturating_mul(RANKS_PER_PAGE);
        if page == 0 || start >= self.entries.len() {
            return &[];
        }
        let end = (start + RANKS_PER_PAGE).min(self.entries.len());
        &self.entries[start..end]
    }
}

/// Hides all but the first and last character of a name.
///
/// One character is shown as is, two characters keep only the first.
pub fn mask_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    match chars.as_slice() {
        [] | [_] => name.to_owned(),
        [first, _] => format!("{first}*"),
        [first, middle @ .., last] => {
            let mut masked = String::with_capacity(name.len());
            masked.push(*first);
            masked.extend(core::iter::repeat_n('*', middle.len()));
            masked.push(*last);
            masked
        }
    }
}
