//! Git source acquisition: clone, reference checkout (branch/tag/commit),
//! and the HTTPS→SSH fallback rewrite used when an anonymous clone is
//! rejected.

use std::path::Path;

use git2::{Cred, FetchOptions, RemoteCallbacks, Repository};

use super::error::{Error, Result};

/// Rewrites `https://<host>/<path>` into `git@<host>:<path>`, the form an
/// SSH remote expects.
pub fn rewrite_to_ssh(url: &str) -> Option<String> {
    let rest = url.strip_prefix("https://")?;
    let (host, path) = rest.split_once('/')?;
    Some(format!("git@{host}:{path}"))
}

fn ssh_fetch_options(ssh_passphrase: Option<&str>) -> FetchOptions<'static> {
    let passphrase = ssh_passphrase.map(str::to_string);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
        Cred::ssh_key(
            username_from_url.unwrap_or("git"),
            None,
            Path::new(&home).join(".ssh/id_rsa").as_path(),
            passphrase.as_deref(),
        )
    });
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Clones `url` into `dest` and checks out `reference` (a branch, tag, or
/// commit hash). If the anonymous clone fails with an authentication
/// error, retries once over SSH using `~/.ssh/id_rsa`.
pub fn clone_and_checkout(url: &str, reference: &str, dest: &Path, ssh_passphrase: Option<&str>) -> Result<()> {
    let repo = match Repository::clone(url, dest) {
        Ok(repo) => repo,
        Err(e) if e.class() == git2::ErrorClass::Http || e.code() == git2::ErrorCode::Auth => {
            let ssh_url = rewrite_to_ssh(url)
                .ok_or_else(|| Error::Git(url.to_string(), e))?;
            log::warn!("anonymous clone of '{url}' failed, retrying over ssh as '{ssh_url}'");
            let mut builder = git2::build::RepoBuilder::new();
            builder.fetch_options(ssh_fetch_options(ssh_passphrase));
            builder
                .clone(&ssh_url, dest)
                .map_err(|e| Error::Git(ssh_url.clone(), e))?
        }
        Err(e) => return Err(Error::Git(url.to_string(), e)),
    };
    checkout_reference(&repo, reference).map_err(|e| Error::Git(reference.to_string(), e))
}

fn checkout_reference(repo: &Repository, reference: &str) -> std::result::Result<(), git2::Error> {
    let object = repo.revparse_single(reference).or_else(|_| {
        repo.revparse_single(&format!("origin/{reference}"))
    })?;
    repo.checkout_tree(&object, None)?;

    if repo.find_branch(reference, git2::BranchType::Local).is_err() {
        if let Ok(remote_branch) = repo.find_branch(&format!("origin/{reference}"), git2::BranchType::Remote) {
            if let Some(commit) = remote_branch.get().target() {
                let commit = repo.find_commit(commit)?;
                repo.branch(reference, &commit, false)?;
            }
        }
    }

    repo.set_head_detached(object.id())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_https_to_ssh() {
        assert_eq!(
            rewrite_to_ssh("https://github.com/foo/bar.git"),
            Some("git@github.com:foo/bar.git".to_string())
        );
    }

    #[test]
    fn leaves_non_https_untouched() {
        assert_eq!(rewrite_to_ssh("git@github.com:foo/bar.git"), None);
    }
}
