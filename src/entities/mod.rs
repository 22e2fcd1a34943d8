//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod favorite;
pub mod inquiry;
pub mod property;
pub mod property_view;
pub mod system_state;
pub mod user_profile;
pub mod viewing;

// Re-export specific types to avoid conflicts
pub use favorite::{Column as FavoriteColumn, Entity as Favorite, Model as FavoriteModel};
pub use inquiry::{Column as InquiryColumn, Entity as Inquiry, Model as InquiryModel};
pub use property::{Column as PropertyColumn, Entity as Property, Model as PropertyModel};
pub use property_view::{
    Column as PropertyViewColumn, Entity as PropertyView, Model as PropertyViewModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use user_profile::{
    Column as UserProfileColumn, Entity as UserProfile, Model as UserProfileModel,
};
pub use viewing::{Column as ViewingColumn, Entity as Viewing, Model as ViewingModel};
