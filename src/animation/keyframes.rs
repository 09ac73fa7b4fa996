//! Keyframe CSS for every non-draw animation name.
//!
//! Each entry defines `@keyframes <name>`, so the keyframe name always equals
//! the animation name used in the `animation:` shorthand.

const KEYFRAMES: &[(&str, &str)] = &[
    (
        "spin",
        "@keyframes spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }",
    ),
    (
        "spin-reverse",
        "@keyframes spin-reverse { from { transform: rotate(360deg); } to { transform: rotate(0deg); } }",
    ),
    (
        "pulse",
        "@keyframes pulse { 0%, 100% { opacity: 1; } 50% { opacity: 0.5; } }",
    ),
    (
        "pulse-grow",
        "@keyframes pulse-grow { 0%, 100% { transform: scale(1); } 50% { transform: scale(1.15); } }",
    ),
    (
        "bounce",
        "@keyframes bounce { 0%, 20%, 50%, 80%, 100% { transform: translateY(0); } 40% { transform: translateY(-15%); } 60% { transform: translateY(-7%); } }",
    ),
    (
        "bounce-horizontal",
        "@keyframes bounce-horizontal { 0%, 20%, 50%, 80%, 100% { transform: translateX(0); } 40% { transform: translateX(-15%); } 60% { transform: translateX(-7%); } }",
    ),
    (
        "shake",
        "@keyframes shake { 0%, 100% { transform: translateX(0); } 10%, 30%, 50%, 70%, 90% { transform: translateX(-4%); } 20%, 40%, 60%, 80% { transform: translateX(4%); } }",
    ),
    (
        "shake-vertical",
        "@keyframes shake-vertical { 0%, 100% { transform: translateY(0); } 10%, 30%, 50%, 70%, 90% { transform: translateY(-4%); } 20%, 40%, 60%, 80% { transform: translateY(4%); } }",
    ),
    (
        "fade",
        "@keyframes fade { 0%, 100% { opacity: 1; } 50% { opacity: 0; } }",
    ),
    (
        "fade-in",
        "@keyframes fade-in { from { opacity: 0; } to { opacity: 1; } }",
    ),
    (
        "fade-out",
        "@keyframes fade-out { from { opacity: 1; } to { opacity: 0; } }",
    ),
    (
        "float",
        "@keyframes float { 0%, 100% { transform: translateY(0); } 50% { transform: translateY(-10%); } }",
    ),
    (
        "blink",
        "@keyframes blink { 0%, 49% { opacity: 1; } 50%, 100% { opacity: 0; } }",
    ),
    (
        "glow",
        "@keyframes glow { 0%, 100% { filter: drop-shadow(0 0 0 currentColor); } 50% { filter: drop-shadow(0 0 4px currentColor); } }",
    ),
    (
        "swing",
        "@keyframes swing { 20% { transform: rotate(15deg); } 40% { transform: rotate(-10deg); } 60% { transform: rotate(5deg); } 80% { transform: rotate(-5deg); } 100% { transform: rotate(0deg); } }",
    ),
    (
        "wobble",
        "@keyframes wobble { 0%, 100% { transform: translateX(0) rotate(0deg); } 15% { transform: translateX(-25%) rotate(-5deg); } 30% { transform: translateX(20%) rotate(3deg); } 45% { transform: translateX(-15%) rotate(-3deg); } 60% { transform: translateX(10%) rotate(2deg); } 75% { transform: translateX(-5%) rotate(-1deg); } }",
    ),
    (
        "rubber-band",
        "@keyframes rubber-band { 0%, 100% { transform: scale(1, 1); } 30% { transform: scale(1.25, 0.75); } 40% { transform: scale(0.75, 1.25); } 50% { transform: scale(1.15, 0.85); } 65% { transform: scale(0.95, 1.05); } 75% { transform: scale(1.05, 0.95); } }",
    ),
    (
        "jello",
        "@keyframes jello { 0%, 11.1%, 100% { transform: skew(0deg, 0deg); } 22.2% { transform: skew(-12.5deg, -12.5deg); } 33.3% { transform: skew(6.25deg, 6.25deg); } 44.4% { transform: skew(-3.125deg, -3.125deg); } 55.5% { transform: skew(1.5625deg, 1.5625deg); } 66.6% { transform: skew(-0.78125deg, -0.78125deg); } 77.7% { transform: skew(0.390625deg, 0.390625deg); } 88.8% { transform: skew(-0.1953125deg, -0.1953125deg); } }",
    ),
    (
        "heartbeat",
        "@keyframes heartbeat { 0%, 28%, 70% { transform: scale(1); } 14%, 42% { transform: scale(1.3); } }",
    ),
    (
        "tada",
        "@keyframes tada { 0%, 100% { transform: scale(1) rotate(0deg); } 10%, 20% { transform: scale(0.9) rotate(-3deg); } 30%, 50%, 70%, 90% { transform: scale(1.1) rotate(3deg); } 40%, 60%, 80% { transform: scale(1.1) rotate(-3deg); } }",
    ),
    (
        "zoom-in",
        "@keyframes zoom-in { from { opacity: 0; transform: scale(0.3); } to { opacity: 1; transform: scale(1); } }",
    ),
    (
        "zoom-out",
        "@keyframes zoom-out { from { opacity: 1; transform: scale(1); } to { opacity: 0; transform: scale(0.3); } }",
    ),
    (
        "slide-in-up",
        "@keyframes slide-in-up { from { opacity: 0; transform: translateY(100%); } to { opacity: 1; transform: translateY(0); } }",
    ),
    (
        "slide-in-down",
        "@keyframes slide-in-down { from { opacity: 0; transform: translateY(-100%); } to { opacity: 1; transform: translateY(0); } }",
    ),
    (
        "slide-in-left",
        "@keyframes slide-in-left { from { opacity: 0; transform: translateX(-100%); } to { opacity: 1; transform: translateX(0); } }",
    ),
    (
        "slide-in-right",
        "@keyframes slide-in-right { from { opacity: 0; transform: translateX(100%); } to { opacity: 1; transform: translateX(0); } }",
    ),
    (
        "flip",
        "@keyframes flip { from { transform: perspective(400px) rotateY(0deg); } to { transform: perspective(400px) rotateY(360deg); } }",
    ),
    (
        "flip-x",
        "@keyframes flip-x { from { transform: perspective(400px) rotateX(0deg); } to { transform: perspective(400px) rotateX(360deg); } }",
    ),
];

/// Returns the `@keyframes` rule for an animation name.
///
/// Draw animations are not in this table; they are produced by
/// [`draw`](super::draw) because they need a path-measuring script.
pub fn keyframes_for(name: &str) -> Option<&'static str> {
    KEYFRAMES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, css)| *css)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframe_name_matches_animation_name() {
        for (name, css) in KEYFRAMES {
            assert!(
                css.starts_with(&format!("@keyframes {name} {{")),
                "{name} defines a different keyframe name"
            );
        }
    }

    #[test]
    fn draw_is_not_in_table() {
        assert!(keyframes_for("draw").is_none());
        assert!(keyframes_for("spin").is_some());
    }
}
