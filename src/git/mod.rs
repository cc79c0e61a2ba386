mod commits;
mod remote;
mod repo;
mod tags;

pub use commits::commits_since;
pub use remote::{commit_url, origin_web_url, parse_remote_url};
pub use repo::open_repo;
pub use tags::{create_tag, latest_version_tag, VersionTag};
