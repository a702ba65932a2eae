pub mod actions;
pub mod directory;
pub mod error;
pub mod graphql;
pub mod models;
pub mod queries;
pub mod upload;

pub use actions::PortfolioClient;
pub use directory::{EnsuredUser, UserDirectory};
pub use error::{ClientError, ClientResult};
pub use graphql::{Auth, GraphQLClient, RequestContext};
pub use models::{
    Connection, Creator, NewUser, PageInfo, Project, ProjectConnection, ProjectForm,
    ProjectSummary, UserProfile, UserWithProjects, CATEGORIES,
};
pub use upload::{is_base64_data_url, HttpImageUploader, ImageUploader};
