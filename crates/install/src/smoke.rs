//! Post-install smoke test

use keg_errors::UserFacingError;
use keg_events::{AppEvent, EventEmitter, TestEvent};
use keg_platform::{Platform, PlatformCommand, PlatformContext};
use keg_types::{InstalledLayout, InvocationOutcome, PackageDescriptor, TestResult, TestStep};

/// Run each test step of `descriptor` against an installed layout
///
/// Invocations run one after another; all of them run even after a failure
/// so the report is complete. An executable that cannot be started counts
/// as a failed invocation. Use [`TestResult::into_result`] to turn a
/// failing result into `TestFailure`.
pub async fn run_smoke_test(
    platform: &Platform,
    ctx: &PlatformContext,
    descriptor: &PackageDescriptor,
    layout: &InstalledLayout,
) -> TestResult {
    let package = descriptor.name.clone();
    ctx.emit(AppEvent::Test(TestEvent::Started {
        package: package.clone(),
        invocations: descriptor.test.len(),
    }));

    let mut invocations = Vec::with_capacity(descriptor.test.len());
    for step in &descriptor.test {
        let outcome = run_step(platform, ctx, step, layout).await;
        tracing::debug!(
            invocation = %outcome.invocation,
            exit_code = ?outcome.exit_code,
            "smoke test invocation finished"
        );
        ctx.emit(AppEvent::Test(TestEvent::InvocationCompleted {
            package: package.clone(),
            invocation: outcome.invocation.clone(),
            exit_code: outcome.exit_code,
            success: outcome.succeeded(),
        }));
        invocations.push(outcome);
    }

    let result = TestResult {
        name: package.clone(),
        invocations,
    };
    match result.first_failure() {
        Some(failure) => ctx.emit(AppEvent::Test(TestEvent::Failed {
            package,
            invocation: failure.invocation.clone(),
            status: failure.status_description(),
        })),
        None => ctx.emit(AppEvent::Test(TestEvent::Passed { package })),
    }
    result
}

async fn run_step(
    platform: &Platform,
    ctx: &PlatformContext,
    step: &TestStep,
    layout: &InstalledLayout,
) -> InvocationOutcome {
    let exe = layout.resolve(&step.exe);
    let Some(program) = exe.to_str() else {
        return InvocationOutcome::not_started(
            step.invocation(),
            step.expected_status,
            format!("{} is not valid UTF-8", exe.display()),
        );
    };

    let mut cmd = PlatformCommand::new(program);
    cmd.args(&step.args).current_dir(&layout.prefix);
    match platform.process().execute_command(ctx, cmd).await {
        Ok(output) => InvocationOutcome {
            invocation: step.invocation(),
            exit_code: output.status.code(),
            expected_status: step.expected_status,
            stdout: output.stdout_lossy(),
            stderr: output.stderr_lossy(),
            launch_error: None,
        },
        Err(e) => InvocationOutcome::not_started(
            step.invocation(),
            step.expected_status,
            e.user_message().into_owned(),
        ),
    }
}
