//! # Phase Content
//!
//! Static copy shown on the daily cards.
//!
//! - [`PhaseContext`]: title, what is going on, common misreads, general smart moves
//! - [`MoodInterpretation`]: how a logged mood reads in a given phase, plus moves for that mood
//!
//! Personalised smart moves live in storage and replace the general ones at card assembly.
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::calculator::CyclePhase;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseContext {
    pub title: &'static str,
    pub what_is_happening: &'static str,
    pub common_misreads: &'static [&'static str],
    pub general_smart_moves: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInterpretation {
    pub interpretation: &'static str,
    pub smart_moves: &'static [&'static str],
}

/// Moods with a written interpretation. Anything else falls back to generic copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mood {
    Stressed,
    Cranky,
    Energized,
    Frisky,
    Calm,
}

const MENSTRUAL: PhaseContext = PhaseContext {
    title: "Menstrual Phase",
    what_is_happening: "Hormone levels (estrogen and progesterone) are at their lowest. Energy may be lower, and she might be more introspective. The body is shedding the uterine lining.",
    common_misreads: &[
        "Lower energy or wanting alone time isn't about you",
        "Physical discomfort might make her seem distant or short",
        "She's not upset, she might just be tired or cramping",
    ],
    general_smart_moves: &[
        "Offer to handle more tasks without being asked",
        "Check in with genuine care, not obligation",
        "Heat pack, favorite snack, low-key evening at home",
    ],
};

const FOLLICULAR: PhaseContext = PhaseContext {
    title: "Follicular Phase",
    what_is_happening: "Estrogen starts rising. Energy increases, mood tends to lift, and she may feel more social, creative, and motivated. This is often the 'feel-good' phase.",
    common_misreads: &[
        "Higher energy doesn't mean she wants to say yes to everything",
        "She's not necessarily looking for more plans, just feeling capable",
    ],
    general_smart_moves: &[
        "This is a good time for deeper conversations or planning",
        "Support new ideas or projects she's excited about",
        "Date nights and social time tend to go well",
    ],
};

const OVULATION: PhaseContext = PhaseContext {
    title: "Ovulation Phase",
    what_is_happening: "Estrogen peaks, testosterone rises slightly. She's likely feeling confident, attractive, and socially connected. Sex drive may be higher.",
    common_misreads: &[
        "She's not flirting with everyone, she just feels good",
        "Increased confidence isn't arrogance or dismissiveness",
    ],
    general_smart_moves: &[
        "Compliment her, she'll receive it well right now",
        "Good time for intimacy and connection",
        "She might appreciate being seen and appreciated",
    ],
};

const LUTEAL: PhaseContext = PhaseContext {
    title: "Luteal Phase",
    what_is_happening: "Progesterone rises, then both estrogen and progesterone drop before the next period. Energy may decline, emotions can feel bigger, and she might be more sensitive or irritable.",
    common_misreads: &[
        "Sensitivity isn't overreacting, her nervous system is genuinely more reactive",
        "Irritability isn't about you, it's hormonal turbulence",
        "Wanting comfort or reassurance isn't weakness",
    ],
    general_smart_moves: &[
        "Give space when she needs it, closeness when she asks",
        "Avoid criticism or jokes that might land wrong",
        "Validate feelings without trying to fix them",
    ],
};

pub fn phase_context(phase: CyclePhase) -> &'static PhaseContext {
    match phase {
        CyclePhase::Menstrual => &MENSTRUAL,
        CyclePhase::Follicular => &FOLLICULAR,
        CyclePhase::Ovulation => &OVULATION,
        CyclePhase::Luteal => &LUTEAL,
    }
}

/// Interpretation of a logged mood during `phase`, matched case-insensitively.
pub fn mood_interpretation(phase: CyclePhase, mood: &str) -> Option<&'static MoodInterpretation> {
    let mood: Mood = mood.trim().parse().ok()?;

    Some(&MOOD_TABLE[phase_index(phase)][mood as usize])
}

fn phase_index(phase: CyclePhase) -> usize {
    match phase {
        CyclePhase::Menstrual => 0,
        CyclePhase::Follicular => 1,
        CyclePhase::Ovulation => 2,
        CyclePhase::Luteal => 3,
    }
}

const fn interpretation(
    interpretation: &'static str,
    smart_moves: &'static [&'static str],
) -> MoodInterpretation {
    MoodInterpretation {
        interpretation,
        smart_moves,
    }
}

// rows follow phase_index, columns follow Mood declaration order
static MOOD_TABLE: [[MoodInterpretation; 5]; 4] = [
    [
        interpretation(
            "Low hormone levels + stress means her nervous system is working overtime. She's dealing with physical discomfort AND external pressure.",
            &[
                "Take things off her plate without being asked",
                "Don't add decision fatigue, just handle it",
                "Physical comfort matters: heat, rest, quiet",
            ],
        ),
        interpretation(
            "Cramps, fatigue, and low hormones create a low tolerance for minor irritations. It's not personal, her body is working hard.",
            &[
                "Give extra space and patience",
                "Don't take short responses personally",
                "Skip the jokes, timing is everything",
            ],
        ),
        interpretation(
            "Even during her period, she might have moments of clarity or energy. Hormones are low but stable.",
            &[
                "Support her momentum, but don't push",
                "She might want to nest or organize",
                "Good time for low-key quality time",
            ],
        ),
        interpretation(
            "Menstruation doesn't mean zero libido. Some women feel more connected to their bodies during this time.",
            &[
                "Follow her lead on intimacy",
                "Normalize and welcome it",
                "Comfort and connection are key",
            ],
        ),
        interpretation(
            "She's in a grounded, introspective space. Hormones are at baseline, which can feel peaceful.",
            &[
                "Match her energy, no need to amp things up",
                "Good time for meaningful conversation",
                "Respect her need for stillness",
            ],
        ),
    ],
    [
        interpretation(
            "Rising estrogen usually boosts mood, but stress can override that. She's capable but overwhelmed.",
            &[
                "Help her prioritize, she might be overcommitting",
                "Remind her it's okay to say no",
                "Suggest a break or reset activity",
            ],
        ),
        interpretation(
            "Unusual for this phase. Something external is likely the cause, not hormones.",
            &[
                "Ask what's wrong, don't assume it's hormonal",
                "Listen without trying to fix",
                "Give her agency to solve it",
            ],
        ),
        interpretation(
            "This is peak follicular phase energy. She's feeling capable, creative, and motivated.",
            &[
                "Support her projects and ideas",
                "Great time for planning and deep talks",
                "Match her energy with enthusiasm",
            ],
        ),
        interpretation(
            "Estrogen is climbing, which boosts libido and confidence. She's feeling good in her body.",
            &[
                "Initiate connection and intimacy",
                "Compliments land well right now",
                "Quality time and romance go far",
            ],
        ),
        interpretation(
            "She's in a steady, positive state. Hormones are rising but not peaking yet.",
            &[
                "Enjoy the ease, no special action needed",
                "Good time for collaboration and teamwork",
                "Build on this momentum together",
            ],
        ),
    ],
    [
        interpretation(
            "Peak estrogen usually means peak confidence, but stress can create a mismatch. She's capable but stretched thin.",
            &[
                "Acknowledge she's doing a lot",
                "Lighten her load where you can",
                "Don't minimize her stress",
            ],
        ),
        interpretation(
            "Rare for ovulation. External factors are likely at play, not her cycle.",
            &[
                "Ask directly what's bothering her",
                "Don't dismiss it as hormonal",
                "Validate and support",
            ],
        ),
        interpretation(
            "Peak hormonal state. She's feeling confident, social, and at her best.",
            &[
                "Appreciate and acknowledge her energy",
                "Great time for adventures or social plans",
                "She'll likely initiate and lead",
            ],
        ),
        interpretation(
            "Ovulation = peak fertility and peak libido. Biologically primed for connection.",
            &[
                "Prioritize intimacy and quality time",
                "She feels attractive and wants to be desired",
                "Show appreciation and attraction",
            ],
        ),
        interpretation(
            "Confident and steady. High estrogen without the intensity.",
            &[
                "Match her relaxed confidence",
                "Good time for meaningful connection",
                "Enjoy the emotional closeness",
            ],
        ),
    ],
    [
        interpretation(
            "Progesterone drop + stress = heightened reactivity. Her nervous system is genuinely more sensitive right now.",
            &[
                "Extra patience is essential",
                "Reduce stressors where possible",
                "Validate feelings without trying to fix",
            ],
        ),
        interpretation(
            "Classic PMS. Progesterone drop makes everything feel more irritating. It's biochemical, not personal.",
            &[
                "Give space when she needs it",
                "Don't take things personally",
                "Avoid criticism or 'helpful' suggestions",
            ],
        ),
        interpretation(
            "She might be pushing through luteal fatigue or finding pockets of energy. Less common but possible.",
            &[
                "Support her momentum but watch for burnout",
                "She might be masking discomfort",
                "Check in on how she's really feeling",
            ],
        ),
        interpretation(
            "Progesterone can increase intimacy desire for some, even as energy drops. Connection matters.",
            &[
                "Respond to her cues",
                "Emotional intimacy might matter more than physical",
                "Be present and attentive",
            ],
        ),
        interpretation(
            "She's managing the luteal phase well. Hormones are shifting but she's grounded.",
            &[
                "Maintain the peace, no drama",
                "Low-key support and presence",
                "Don't rock the boat",
            ],
        ),
    ],
];

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_phase_has_content() {
        for phase in CyclePhase::iter() {
            let context = phase_context(phase);

            assert!(context.title.to_lowercase().starts_with(&phase.to_string()));
            assert!(!context.common_misreads.is_empty());
            assert!(!context.general_smart_moves.is_empty());
        }
    }

    #[test]
    fn test_mood_lookup() {
        let cranky = mood_interpretation(CyclePhase::Luteal, "cranky").unwrap();
        assert!(cranky.interpretation.starts_with("Classic PMS"));

        let calm = mood_interpretation(CyclePhase::Follicular, " Calm ").unwrap();
        assert!(calm.interpretation.contains("steady, positive"));

        assert!(mood_interpretation(CyclePhase::Ovulation, "FRISKY").is_some());
        assert!(mood_interpretation(CyclePhase::Menstrual, "hungry").is_none());
    }

    #[test]
    fn test_every_mood_has_moves() {
        for phase in CyclePhase::iter() {
            for mood in ["stressed", "cranky", "energized", "frisky", "calm"] {
                let entry = mood_interpretation(phase, mood).unwrap();

                assert!(!entry.smart_moves.is_empty(), "{phase} {mood}");
            }
        }
    }
}
