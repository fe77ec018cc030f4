//! Turbine power and thrust curves.

use crate::config::TurbineModel;

/// Electrical output in kW at wind speed `speed` (m/s).
///
/// Zero below cut-in and at or above cut-out. Between cut-in and rated
/// speed output follows the cubic law, scaled so it is 0 at cut-in and
/// `rated_output` at rated speed; above rated speed it holds at
/// `rated_output`.
pub fn power_output(model: &TurbineModel, speed: f64) -> f64 {
    if speed.is_nan() || speed < model.cut_in || speed >= model.cut_out {
        return 0.0;
    }
    if speed >= model.rated_speed {
        return model.rated_output;
    }
    let ci3 = model.cut_in.powi(3);
    let fraction = (speed.powi(3) - ci3) / (model.rated_speed.powi(3) - ci3);
    model.rated_output * fraction
}

/// Thrust coefficient at wind speed `speed` (m/s).
///
/// An idle turbine (outside cut-in..cut-out) casts no wake. Below rated
/// speed thrust holds at `ct_max`; above it pitch control sheds load and
/// thrust falls with the square of the speed ratio.
pub fn thrust_coefficient(model: &TurbineModel, speed: f64, ct_max: f64) -> f64 {
    if speed.is_nan() || speed < model.cut_in || speed >= model.cut_out {
        return 0.0;
    }
    if speed <= model.rated_speed {
        return ct_max;
    }
    ct_max * (model.rated_speed / speed).powi(2)
}
