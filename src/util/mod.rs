use directories::ProjectDirs;

pub mod assets;
pub mod persistence;

const APP_QUALIFIER: &str = "jp";
const APP_ORG: &str = "AkiyaAdvisor";
const APP_NAME: &str = "akiya-advisor";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}
