mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod entity_page;
pub use entity_page::entity_page;

mod home;
pub use home::HomeView;

mod login;
pub use login::LoginView;

mod profile;
pub use profile::ProfileView;
