//! Remote locations and download tasks.
//!
//! A [`RemoteLocation`] is a server plus a path on that server. The metadata
//! service reports them as combined strings such as
//! `ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz`, which
//! are split on the first `/`.
//!
//! ```rust
//! use srafetch::download::{DownloadTask, RemoteLocation};
//! use std::path::Path;
//!
//! let location: RemoteLocation = "ftp.example.org/vol1/a_1.fastq.gz".parse()?;
//! assert_eq!(location.server(), "ftp.example.org");
//! assert_eq!(location.path(), "vol1/a_1.fastq.gz");
//!
//! let task = DownloadTask::new(0, location, Path::new("output"));
//! assert_eq!(task.filename(), "a_1.fastq.gz");
//! # Ok::<(), srafetch::Error>(())
//! ```

use crate::error::Error;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;
use std::str::FromStr;

/// Identifier of a task inside one run: its index in the flattened task list.
pub type TaskId = usize;

/// One downloadable object: a server and a path on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteLocation {
    server: String,
    path: String,
}

impl RemoteLocation {
    /// Creates a new [`RemoteLocation`], validating both parts.
    pub fn new(server: &str, path: &str) -> Result<Self, Error> {
        if server.is_empty() {
            return Err(Error::InvalidLocation(format!(
                "\"{}/{}\" has an empty server",
                server, path
            )));
        }
        if path.is_empty() || path.starts_with('/') || path.ends_with('/') {
            return Err(Error::InvalidLocation(format!(
                "\"{}/{}\" has no usable path",
                server, path
            )));
        }
        Ok(Self {
            server: server.to_string(),
            path: path.to_string(),
        })
    }

    /// Host name of the file server.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Path of the object on the server, without a leading separator.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final segment of the path, used as the local file name.
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl FromStr for RemoteLocation {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let value = value.strip_prefix("ftp://").unwrap_or(value);
        match value.split_once('/') {
            Some((server, path)) => RemoteLocation::new(server, path),
            None => Err(Error::InvalidLocation(format!(
                "\"{}\" does not contain a path separator",
                value
            ))),
        }
    }
}

impl TryFrom<&str> for RemoteLocation {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.path)
    }
}

/// A single unit of work for the worker pool.
///
/// Tasks are immutable once created; a worker takes ownership of a task when it
/// claims it from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    id: TaskId,
    location: RemoteLocation,
    destination: PathBuf,
}

impl DownloadTask {
    /// Creates a task writing `location` into `directory`, named after the
    /// location's final path segment.
    pub fn new(id: TaskId, location: RemoteLocation, directory: &Path) -> Self {
        let destination = directory.join(location.filename());
        Self {
            id,
            location,
            destination,
        }
    }

    /// Creates a task with an explicit destination path.
    pub fn with_destination(id: TaskId, location: RemoteLocation, destination: PathBuf) -> Self {
        Self {
            id,
            location,
            destination,
        }
    }

    /// Builds the flat task list for `locations`, numbering tasks in order.
    pub fn from_locations<I>(locations: I, directory: &Path) -> Vec<DownloadTask>
    where
        I: IntoIterator<Item = RemoteLocation>,
    {
        let tasks: Vec<DownloadTask> = locations
            .into_iter()
            .enumerate()
            .map(|(id, location)| DownloadTask::new(id, location, directory))
            .collect();
        for (first, second) in colliding_destinations(&tasks) {
            warn!(
                first = first.id(),
                second = second.id(),
                "{} and {} both write {:?}",
                first.location(),
                second.location(),
                second.destination()
            );
        }
        tasks
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn location(&self) -> &RemoteLocation {
        &self.location
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Local file name of the task.
    pub fn filename(&self) -> &str {
        self.location.filename()
    }
}

/// Pairs of tasks writing the same destination, each later task paired with
/// the first task that claimed its path.
pub fn colliding_destinations(tasks: &[DownloadTask]) -> Vec<(&DownloadTask, &DownloadTask)> {
    let mut claimed: HashMap<&Path, &DownloadTask> = HashMap::new();
    let mut collisions = Vec::new();
    for task in tasks {
        match claimed.get(task.destination()) {
            Some(first) => collisions.push((*first, task)),
            None => {
                claimed.insert(task.destination(), task);
            }
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_separator() {
        let location: RemoteLocation =
            "ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz"
                .parse()
                .unwrap();
        assert_eq!(location.server(), "ftp.sra.ebi.ac.uk");
        assert_eq!(location.path(), "vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz");
        assert_eq!(location.filename(), "SRR000001_1.fastq.gz");
    }

    #[test]
    fn test_parse_accepts_scheme_prefix() {
        let location = RemoteLocation::try_from("ftp://ftp.example.org/a.gz").unwrap();
        assert_eq!(location.server(), "ftp.example.org");
        assert_eq!(location.path(), "a.gz");
        assert_eq!(location.to_string(), "ftp.example.org/a.gz");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            "ftp.example.org".parse::<RemoteLocation>(),
            Err(Error::InvalidLocation(_))
        ));
        assert!("/vol1/a.gz".parse::<RemoteLocation>().is_err());
        assert!("ftp.example.org/".parse::<RemoteLocation>().is_err());
        assert!("ftp.example.org//a.gz".parse::<RemoteLocation>().is_err());
        assert!("ftp.example.org/vol1/".parse::<RemoteLocation>().is_err());
        assert!("".parse::<RemoteLocation>().is_err());
    }

    #[test]
    fn test_task_destination() {
        let location: RemoteLocation = "ftp.example.org/vol1/a_2.fastq.gz".parse().unwrap();
        let task = DownloadTask::new(3, location.clone(), Path::new("/tmp/out"));
        assert_eq!(task.id(), 3);
        assert_eq!(task.location(), &location);
        assert_eq!(task.destination(), Path::new("/tmp/out/a_2.fastq.gz"));
    }

    #[test]
    fn test_from_locations_keeps_order() {
        let locations = vec![
            "h/one.gz".parse::<RemoteLocation>().unwrap(),
            "h/two.gz".parse().unwrap(),
            "h/three.gz".parse().unwrap(),
        ];
        let tasks = DownloadTask::from_locations(locations, Path::new("out"));
        let names: Vec<_> = tasks.iter().map(|t| (t.id(), t.filename())).collect();
        assert_eq!(names, vec![(0, "one.gz"), (1, "two.gz"), (2, "three.gz")]);
    }

    #[test]
    fn test_colliding_destinations() {
        let locations = vec![
            "mirror-a/vol1/run.fastq.gz".parse::<RemoteLocation>().unwrap(),
            "mirror-b/vol2/run.fastq.gz".parse().unwrap(),
            "mirror-a/vol1/other.fastq.gz".parse().unwrap(),
            "mirror-c/run.fastq.gz".parse().unwrap(),
        ];
        let tasks = DownloadTask::from_locations(locations, Path::new("out"));

        let ids: Vec<_> = colliding_destinations(&tasks)
            .iter()
            .map(|(first, second)| (first.id(), second.id()))
            .collect();
        assert_eq!(ids, vec![(0, 1), (0, 3)]);
        assert_eq!(tasks.len(), 4);
    }

    #[test]
    fn test_distinct_destinations_do_not_collide() {
        let locations = vec![
            "h/a_1.fastq.gz".parse::<RemoteLocation>().unwrap(),
            "h/a_2.fastq.gz".parse().unwrap(),
        ];
        let tasks = DownloadTask::from_locations(locations, Path::new("out"));
        assert!(colliding_destinations(&tasks).is_empty());
    }
}
