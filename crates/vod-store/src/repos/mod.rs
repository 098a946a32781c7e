//! Typed repositories over the datastore.
//!
//! Each repository owns one collection: it knows the collection name,
//! the field layout, and the conversions between stored records and
//! the model types. Cross-collection composition (hydrating playlist
//! pages into videos, cascading deletes) happens in the service layer,
//! never here.

mod categories;
mod playlists;
mod reactions;
mod subscriptions;
mod users;
mod videos;
mod views;

pub use categories::CategoryRepository;
pub use playlists::{PlaylistItemRepository, PlaylistRepository};
pub use reactions::{ReactionCounts, ReactionRepository};
pub use subscriptions::SubscriptionRepository;
pub use users::UserRepository;
pub use videos::VideoRepository;
pub use views::ViewRepository;
