use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

text_enum!(
    /// Who a service is offered to.
    Audience {
        Individual => "individual",
        Business => "business",
        Both => "both",
    }
);

text_enum!(ServiceType {
    Visit => "visit",
    Contract => "contract",
    Both => "both",
});

text_enum!(PricingType {
    Visit => "visit",
    Contract => "contract",
});

text_enum!(
    /// Whether the worker lives on site.
    ServiceMode {
        Resident => "resident",
        NonResident => "non_resident",
    }
);

impl Audience {
    /// A service matches a requested audience when it targets it or targets both.
    pub fn serves(&self, requested: Audience) -> bool {
        *self == requested || *self == Audience::Both
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub target_audience: Audience,
    pub service_type: ServiceType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A service joined with its category's display fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub service: Service,
    pub category_name: String,
    pub category_icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithServices {
    #[serde(flatten)]
    pub category: ServiceCategory,
    pub services: Vec<ServiceListing>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServicePricing {
    pub id: i64,
    pub service_id: i64,
    pub pricing_type: PricingType,
    pub service_mode: ServiceMode,
    pub duration_type: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub audience: Option<Audience>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PricingFilter {
    pub pricing_type: Option<PricingType>,
    pub service_mode: Option<ServiceMode>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PricingUpdate {
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
