pub mod auth0;
