pub mod listing;
pub mod order;
pub mod reference;
pub mod user;

pub use listing::{parse_amount, Listing, ListingKind, Pitch, PitchDraft, Product, ProductDraft, Skill, SkillDraft};
pub use order::{ItemType, NewOrder, Order};
pub use reference::{PredefinedSkill, SkillMatch};
pub use user::{NewUser, Role, User};
