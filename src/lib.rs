pub(crate) mod data {
    pub mod datasources {
        pub(crate) mod fake_payment_api_datasource;
        pub mod pay_platform_datasource;
        pub(crate) mod payment_api_datasource;
        pub mod receipt_store_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod payment_api {
            pub(crate) mod error_response_model;
            pub(crate) mod prepare_response_model;
            pub(crate) mod product_model;
            pub(crate) mod transaction_state_model;
        }
    }
    pub(crate) mod repositories {
        pub mod purchase_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod product_info;
        pub mod receipt;
        pub mod transaction;
    }
    pub mod repositories {
        pub mod purchase_repository;
    }
}

pub mod config;
pub mod errors;
pub mod util;

pub use data::datasources::pay_platform_datasource::{
    PayPlatformDatasource, PaymentCompletion, PlatformError, PlatformResult,
};
pub use data::datasources::receipt_store_datasource::{
    DeviceReceiptStore, LocalStorage, MemoryLocalStorage, ReceiptStoreError,
};
pub use data::repositories::purchase_repository_impl::PurchaseRepositoryImpl;
