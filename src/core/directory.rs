//! The file directory: which user published which filename, and whether each
//! publication is currently live.
//!
//! A publication record is keyed by `(filename, username)` and carries a
//! `live` flag: `true` while the owning user is connected, `false` once that
//! user disconnects. Reconnecting flips every dormant record owned by the
//! user back to live, so republishing after a reconnect is not required.
//!
//! A filename with zero records is removed from the directory entirely; the
//! directory never keeps dangling empty entries.
use std::collections::BTreeMap;
use std::panic::Location;

use bittrickle_primitives::username::Username;

use crate::core::error::Error;

/// Publication records for one filename: owner → live flag.
type Owners = BTreeMap<Username, bool>;

/// The directory of published filenames, owned by the tracker for its whole
/// lifetime. Iteration order is lexicographic, which keeps listings and the
/// holder tie-break deterministic.
#[derive(Debug, Default)]
pub struct FileDirectory {
    files: BTreeMap<String, Owners>,
}

impl FileDirectory {
    /// It sets the `(filename, owner)` record to live. Republishing is not an
    /// error.
    pub fn publish(&mut self, filename: &str, owner: &Username) {
        self.files
            .entry(filename.to_owned())
            .or_default()
            .insert(owner.clone(), true);
    }

    /// It removes the `(filename, owner)` record, erasing the filename entry
    /// entirely when the last owner leaves.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotPublished` if the owner has no record, live or
    /// dormant, for the filename.
    pub fn unpublish(&mut self, filename: &str, owner: &Username) -> Result<(), Error> {
        let not_published = || Error::NotPublished {
            filename: filename.to_owned(),
            username: owner.clone(),
            location: Location::caller(),
        };

        let owners = self.files.get_mut(filename).ok_or_else(not_published)?;

        owners.remove(owner).ok_or_else(not_published)?;

        if owners.is_empty() {
            self.files.remove(filename);
        }

        Ok(())
    }

    /// It flips every dormant record owned by the user back to live. Called
    /// when the user reconnects.
    pub fn reactivate(&mut self, owner: &Username) {
        for owners in self.files.values_mut() {
            if let Some(live) = owners.get_mut(owner) {
                *live = true;
            }
        }
    }

    /// It marks every record owned by the user dormant. Called when the user
    /// disconnects. The records are retained for reactivation.
    pub fn deactivate(&mut self, owner: &Username) {
        for owners in self.files.values_mut() {
            if let Some(live) = owners.get_mut(owner) {
                *live = false;
            }
        }
    }

    /// The filenames with a live record owned by the user, in lexicographic
    /// order.
    #[must_use]
    pub fn list_owned(&self, owner: &Username) -> Vec<String> {
        self.files
            .iter()
            .filter(|(_, owners)| owners.get(owner).copied().unwrap_or_default())
            .map(|(filename, _)| filename.clone())
            .collect()
    }

    /// Every owner of the filename, regardless of the record's liveness, in
    /// lexicographic order.
    pub fn owners<'a>(&'a self, filename: &str) -> impl Iterator<Item = &'a Username> {
        self.files.get(filename).into_iter().flat_map(Owners::keys)
    }

    /// Filenames containing `substring` that are not owned at any liveness by
    /// `excluding`, together with the owners holding a live record for them.
    /// Filenames with no live record are omitted; whether the returned owners
    /// also have a live session is for the caller to decide.
    #[must_use]
    pub fn candidates<'a>(&'a self, substring: &str, excluding: &Username) -> Vec<(&'a str, Vec<&'a Username>)> {
        self.files
            .iter()
            .filter(|(filename, owners)| filename.contains(substring) && !owners.contains_key(excluding))
            .filter_map(|(filename, owners)| {
                let live_owners: Vec<&Username> = owners
                    .iter()
                    .filter(|(_, live)| **live)
                    .map(|(owner, _)| owner)
                    .collect();

                if live_owners.is_empty() {
                    None
                } else {
                    Some((filename.as_str(), live_owners))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use bittrickle_primitives::username::Username;

    use super::FileDirectory;
    use crate::core::error::Error;

    fn alice() -> Username {
        "alice".parse().unwrap()
    }

    fn bob() -> Username {
        "bob".parse().unwrap()
    }

    #[test]
    fn it_should_publish_a_file_idempotently() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());
        directory.publish("x.txt", &alice());

        assert_eq!(directory.list_owned(&alice()), vec!["x.txt".to_owned()]);
    }

    #[test]
    fn it_should_track_multiple_owners_for_the_same_filename() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());
        directory.publish("x.txt", &bob());

        assert_eq!(directory.owners("x.txt").collect::<Vec<_>>(), vec![&alice(), &bob()]);
    }

    #[test]
    fn it_should_fail_unpublishing_a_file_the_user_does_not_own() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());

        assert!(matches!(
            directory.unpublish("x.txt", &bob()),
            Err(Error::NotPublished { .. })
        ));
    }

    #[test]
    fn it_should_remove_the_filename_entry_when_the_last_owner_unpublishes() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());
        directory.unpublish("x.txt", &alice()).unwrap();

        assert_eq!(directory.owners("x.txt").count(), 0);
        assert!(directory.candidates("x", &bob()).is_empty());
    }

    #[test]
    fn it_should_keep_the_filename_entry_while_other_owners_remain() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());
        directory.publish("x.txt", &bob());
        directory.unpublish("x.txt", &alice()).unwrap();

        assert_eq!(directory.owners("x.txt").collect::<Vec<_>>(), vec![&bob()]);
    }

    #[test]
    fn it_should_mark_records_dormant_on_deactivation_and_revive_them_on_reactivation() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());

        directory.deactivate(&alice());
        assert!(directory.list_owned(&alice()).is_empty());

        directory.reactivate(&alice());
        assert_eq!(directory.list_owned(&alice()), vec!["x.txt".to_owned()]);
    }

    #[test]
    fn it_should_keep_dormant_records_out_of_the_candidate_lists() {
        let mut directory = FileDirectory::default();

        directory.publish("x.txt", &alice());
        directory.deactivate(&alice());

        assert!(directory.candidates("x", &bob()).is_empty());
    }

    mod when_searching_for_candidates {
        use super::{alice, bob};
        use crate::core::directory::FileDirectory;

        fn carol() -> super::Username {
            "carol".parse().unwrap()
        }

        #[test]
        fn it_should_match_filenames_by_literal_substring() {
            let mut directory = FileDirectory::default();

            directory.publish("report-2024.pdf", &alice());
            directory.publish("notes.txt", &alice());

            let candidates = directory.candidates("report", &bob());

            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].0, "report-2024.pdf");
        }

        #[test]
        fn it_should_exclude_filenames_co_owned_by_the_requester() {
            let mut directory = FileDirectory::default();

            // bob also owns the file, so it is not a candidate for him even
            // though alice is a live owner.
            directory.publish("x.txt", &alice());
            directory.publish("x.txt", &bob());

            assert!(directory.candidates("x", &bob()).is_empty());
            assert!(!directory.candidates("x", &carol()).is_empty());
        }

        #[test]
        fn it_should_return_only_the_owners_with_a_live_record() {
            let mut directory = FileDirectory::default();

            directory.publish("x.txt", &alice());
            directory.publish("x.txt", &carol());
            directory.deactivate(&carol());

            let candidates = directory.candidates("x", &bob());

            assert_eq!(candidates[0].1, vec![&alice()]);
        }
    }
}
