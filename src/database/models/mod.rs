/// Declares a string-backed enum stored as `TEXT` and serialized by its wire name.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[sqlx(type_name = "text")]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                #[sqlx(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod account;
pub mod booking;
pub mod catalog;
pub mod contact;
pub mod provider;
pub mod stats;

pub use account::{Account, AccountFlagsUpdate, AccountType, NewAccount, ProfileUpdate, Role};
pub use booking::{
    AdminBookingUpdate, Booking, BookingDetailsUpdate, BookingStatus, BookingView, NewBooking,
    UpdateOutcome,
};
pub use catalog::{
    Audience, CategoryWithServices, PricingFilter, PricingType, PricingUpdate, Service,
    ServiceCategory, ServiceFilter, ServiceListing, ServiceMode, ServicePricing, ServiceType,
    ServiceUpdate,
};
pub use contact::{ContactStatus, ContactSubmission, NewContact};
pub use provider::{NewProvider, ProviderStatus, ProviderStatusUpdate, ServiceProvider};
pub use stats::{DashboardStats, PageRequest, Pagination, StatusBreakdown, MAX_PAGE};
