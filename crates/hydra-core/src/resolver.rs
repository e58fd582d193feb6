use crate::action::Action;
use crate::engine::EngineState;
use crate::input::InputState;
use crate::latch::LatchState;

/// Magnitude an effective axis must strictly exceed to produce an action.
pub const ACTION_THRESHOLD: f64 = 0.3;

/// Compute the ordered list of active actions.
///
/// Stick rules come first, then the pedal rule, then the lock marker. The
/// result is never empty: a stopped engine yields `[EngineOff]` and a running
/// machine with nothing to do yields `[Idle]`.
pub fn resolve(input: &InputState, latch: &LatchState, engine: EngineState) -> Vec<Action> {
    if engine == EngineState::Stopped {
        return vec![Action::EngineOff];
    }

    let eff = latch.effective(input);
    let t = ACTION_THRESHOLD;
    let mut actions = Vec::with_capacity(6);

    let left = eff.left_stick;
    if left.x < -t {
        actions.push(Action::SwingLeft);
    }
    if left.x > t {
        actions.push(Action::SwingRight);
    }
    if left.y > t {
        actions.push(Action::StickIn);
    }
    if left.y < -t {
        actions.push(Action::StickOut);
    }

    let right = eff.right_stick;
    if right.x < -t {
        actions.push(Action::BucketOpen);
    }
    if right.x > t {
        actions.push(Action::BucketClose);
    }
    if right.y > t {
        actions.push(Action::BoomUp);
    }
    if right.y < -t {
        actions.push(Action::BoomDown);
    }

    let lp = eff.left_pedal.value();
    let rp = eff.right_pedal.value();
    if lp > t && rp > t {
        actions.push(Action::TravelForward);
    } else if lp < -t && rp < -t {
        actions.push(Action::TravelBackward);
    } else {
        if lp > t {
            actions.push(Action::TravelLeft);
        }
        if rp > t {
            actions.push(Action::TravelRight);
        }
    }

    if latch.is_any_locked() {
        actions.push(Action::LockedState);
    }

    if actions.is_empty() {
        actions.push(Action::Idle);
    }
    actions
}
