//! Business logic services

pub mod catalog;
pub mod email;
pub mod lending;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, LoansConfig, UploadsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub lending: lending::LendingService,
    pub email: email::EmailService,
    pub uploads: uploads::UploadService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        loans_config: LoansConfig,
        email_config: EmailConfig,
        uploads_config: &UploadsConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        let lending = lending::LendingService::new(
            Arc::new(repository.clone()),
            loans_config,
            Some(Arc::new(email.clone())),
        );

        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository),
            lending,
            email,
            uploads: uploads::UploadService::new(uploads_config.dir.clone()),
        }
    }
}
