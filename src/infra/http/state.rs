use crate::application::{
    admin::AdminPanel, auth::AuthGate, contact::ContactService, sections::PublicSections,
};

/// State behind the public listener.
#[derive(Clone)]
pub struct HttpState {
    pub sections: PublicSections,
    pub contact: ContactService,
}

/// State behind the admin listener.
#[derive(Clone)]
pub struct AdminState {
    pub gate: AuthGate,
    pub panel: AdminPanel,
}
