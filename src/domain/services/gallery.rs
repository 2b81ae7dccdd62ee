#[cfg(test)]
#[path = "gallery_test.rs"]
mod tests;

use crate::domain::models::CharacterRecord;
use crate::domain::models::Photo;
use crate::domain::models::StudioError;

pub const MAIN_CARD_CAPACITY: usize = 3;

/// A pending selection write: the full selected set to persist, stamped
/// with the sequence number the response must carry back to `resolve`.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionWrite {
    pub seq: u64,
    pub photos: Vec<Photo>,
}

#[derive(Debug, PartialEq)]
pub enum WriteResolution {
    Applied,
    RolledBack,
    /// A newer write was issued while this one was on the wire. Stale
    /// responses neither confirm nor roll back; the newest write decides.
    Discarded,
}

struct Snapshot {
    photos: Vec<Photo>,
    selection: Vec<String>,
}

/// Generated photos plus the bounded main-card selection.
///
/// Toggles apply optimistically: the flip happens locally first and the
/// caller persists the new set. `resolve` then either confirms the write or
/// restores the pre-toggle state exactly. Every write carries a
/// monotonically increasing sequence number so that when two writes race,
/// only the latest one's response is honored.
pub struct Gallery {
    photos: Vec<Photo>,
    selection: Vec<String>,
    next_seq: u64,
    latest_seq: u64,
    snapshot: Option<Snapshot>,
    auto_selected: bool,
}

impl Default for Gallery {
    fn default() -> Gallery {
        return Gallery {
            photos: vec![],
            selection: vec![],
            next_seq: 0,
            latest_seq: 0,
            snapshot: None,
            auto_selected: false,
        };
    }
}

impl Gallery {
    pub fn new() -> Gallery {
        return Gallery::default();
    }

    /// Rebuilds the gallery from a platform character record, keeping the
    /// record's photo order as the selection order.
    pub fn from_record(record: &CharacterRecord) -> Gallery {
        let mut gallery = Gallery::new();
        gallery.photos = record.photos.clone();
        gallery.selection = record
            .photos
            .iter()
            .filter(|e| return e.is_selected)
            .map(|e| return e.id.to_string())
            .collect();

        return gallery;
    }

    pub fn photos(&self) -> &[Photo] {
        return &self.photos;
    }

    /// The main-card photos in selection (append) order.
    pub fn selected(&self) -> Vec<Photo> {
        return self
            .selection
            .iter()
            .filter_map(|id| {
                return self.photos.iter().find(|e| return &e.id == id).cloned();
            })
            .collect();
    }

    /// Appends a freshly generated photo. Photos are unique by id or url;
    /// merging an existing one is a no-op.
    pub fn merge(&mut self, photo: Photo) {
        if self
            .photos
            .iter()
            .any(|e| return e.id == photo.id || e.url == photo.url)
        {
            return;
        }

        self.photos.push(photo);
    }

    /// Flips a photo in or out of the main-card selection and returns the
    /// write to persist. Removing and re-adding a photo moves it to the end
    /// of the selection. Fails without mutating when the photo is unknown
    /// or the card is already full.
    pub fn toggle(&mut self, photo_id: &str) -> Result<SelectionWrite, StudioError> {
        let idx = self
            .photos
            .iter()
            .position(|e| return e.id == photo_id)
            .ok_or_else(|| return StudioError::UnknownPhoto(photo_id.to_string()))?;

        let adding = !self.photos[idx].is_selected;
        if adding && self.selection.len() >= MAIN_CARD_CAPACITY {
            return Err(StudioError::SelectionFull);
        }

        self.snapshot = Some(Snapshot {
            photos: self.photos.clone(),
            selection: self.selection.clone(),
        });

        self.photos[idx].is_selected = adding;
        if adding {
            self.selection.push(photo_id.to_string());
        } else {
            self.selection.retain(|e| return e != photo_id);
        }

        self.next_seq += 1;
        self.latest_seq = self.next_seq;

        return Ok(SelectionWrite {
            seq: self.latest_seq,
            photos: self.selected(),
        });
    }

    /// Selects the first photo a session ever generates, so a character
    /// never ends its first generation with an empty main card. Fires at
    /// most once per session.
    pub fn auto_select_first(&mut self, photo_id: &str) -> Option<SelectionWrite> {
        if self.auto_selected {
            return None;
        }

        self.auto_selected = true;
        if !self.selection.is_empty() {
            return None;
        }

        return self.toggle(photo_id).ok();
    }

    /// Applies the outcome of a persistence call. Responses for anything
    /// but the latest issued write are discarded. A failed latest write
    /// restores both the flipped flag and the selection list to their
    /// pre-toggle values.
    pub fn resolve(&mut self, seq: u64, persisted: bool) -> WriteResolution {
        if seq != self.latest_seq {
            return WriteResolution::Discarded;
        }

        let snapshot = self.snapshot.take();
        if persisted {
            return WriteResolution::Applied;
        }

        if let Some(snapshot) = snapshot {
            self.photos = snapshot.photos;
            self.selection = snapshot.selection;
        }

        return WriteResolution::RolledBack;
    }
}
