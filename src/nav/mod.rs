pub mod animation;
pub mod asset;
pub mod error;
pub mod page;
pub mod plan;
pub mod queue;
pub mod record;
pub mod stack;
pub mod surface;

pub use animation::{Animator, Fade, NoOp, Slide, Transition, Wait};
pub use asset::{Asset, AssetBackend, AssetHandle};
pub use error::{NavError, NavResult};
pub use page::{Page, PageFactory, PageId};
pub use plan::{PopPlan, PushPlan};
pub use queue::{Navigator, NavigatorHandle};
pub use record::PageRecord;
pub use stack::{PageStack, PopOptions, PushOptions, Pushed, StackSnapshot};
pub use surface::{NullSurface, Surface};
