use crate::core::command::Command;
use crate::core::context::WorkerContext;

pub(crate) const CONNECT_FAILED: &str =
    "Unable to connect to the revision control service. Please make sure it's running and try again.";

/// Check the service, settle on a lock user and probe lockable extensions
pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    if !ctx.backend.check_availability() {
        command.add_error(CONNECT_FAILED);
        return false;
    }

    let user = resolve_lock_user(ctx);
    if user.is_empty() {
        log::warn!("Could not determine the lock user");
    } else {
        log::info!("Connected as {}", user);
    }
    ctx.set_lock_user(user);

    if ctx.lockable.is_empty() {
        match ctx.local.probe_lockable(&ctx.lockable_patterns) {
            Ok(extensions) => {
                log::debug!("Lockable extensions: {:?}", extensions);
                ctx.lockable.register(extensions);
            }
            Err(e) => log::warn!("Failed to probe lockable files: {}", e),
        }
    }

    match ctx.local.head_commit() {
        Ok(commit) => command.output.commit = commit,
        Err(e) => log::debug!("Could not read HEAD commit: {}", e),
    }

    true
}

/// Configured user first, then the service's view, then local git config
fn resolve_lock_user(ctx: &WorkerContext) -> String {
    if let Some(user) = ctx.configured_lock_user() {
        return user.to_string();
    }

    match ctx.backend.user_info() {
        Ok(info) if !info.username.is_empty() => return info.username,
        Ok(_) => {}
        Err(e) => log::debug!("Service did not report a user: {}", e),
    }

    ctx.local
        .user_name()
        .ok()
        .flatten()
        .unwrap_or_default()
}
