// src/tutor/demo.rs
// Canned answers for when the chat API is unavailable or unconfigured.
//
// The routing here is the contract: keyword topics are tried in a fixed
// priority order (first match wins), then one of three texts is picked by the
// age band derived from the class level. No I/O and no randomness, so a given
// (question, profile) pair always yields the same text.

use crate::session::StudentProfile;

/// Age band derived from a student's stated class level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    Primary,
    Secondary,
    Senior,
}

impl AgeBand {
    /// Matches whole tokens of the class level, so "Class 12" reads as 12 and
    /// not as the digit 1. Returns `None` for class levels outside the bands
    /// (for example "MBA").
    pub fn from_class_level(class_level: &str) -> Option<Self> {
        let lowered = class_level.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            match token {
                "1" | "2" | "3" | "4" | "5" | "primary" => return Some(Self::Primary),
                "6" | "7" | "8" | "9" | "10" | "secondary" => return Some(Self::Secondary),
                "11" | "12" | "senior" | "plus" => return Some(Self::Senior),
                _ => {}
            }
        }
        None
    }
}

/// Topics the demo responder can answer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    ArtificialIntelligence,
    Photosynthesis,
    Mathematics,
    GeneralScience,
}

const AI_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "ml",
    "neural network",
    "deep learning",
    "chatbot",
];

const PHOTOSYNTHESIS_KEYWORDS: &[&str] = &["photosynthesis", "chlorophyll", "stomata"];

const MATH_KEYWORDS: &[&str] = &[
    "math",
    "maths",
    "mathematics",
    "algebra",
    "geometry",
    "arithmetic",
    "trigonometry",
    "equation",
    "fraction",
];

const SCIENCE_KEYWORDS: &[&str] = &[
    "science",
    "physics",
    "chemistry",
    "biology",
    "experiment",
    "gravity",
    "atom",
];

impl Topic {
    /// First matching topic wins; `lowered` must already be lower-cased.
    fn detect(lowered: &str) -> Option<Self> {
        const TOPICS: &[(Topic, &[&str])] = &[
            (Topic::ArtificialIntelligence, AI_KEYWORDS),
            (Topic::Photosynthesis, PHOTOSYNTHESIS_KEYWORDS),
            (Topic::Mathematics, MATH_KEYWORDS),
            (Topic::GeneralScience, SCIENCE_KEYWORDS),
        ];
        TOPICS
            .iter()
            .find(|(_, keywords)| contains_keyword(lowered, keywords))
            .map(|(topic, _)| *topic)
    }

    fn canned_text(self, band: AgeBand) -> &'static str {
        match (self, band) {
            (Self::ArtificialIntelligence, AgeBand::Primary) => AI_PRIMARY,
            (Self::ArtificialIntelligence, AgeBand::Secondary) => AI_SECONDARY,
            (Self::ArtificialIntelligence, AgeBand::Senior) => AI_SENIOR,
            (Self::Photosynthesis, AgeBand::Primary) => PHOTOSYNTHESIS_PRIMARY,
            (Self::Photosynthesis, AgeBand::Secondary) => PHOTOSYNTHESIS_SECONDARY,
            (Self::Photosynthesis, AgeBand::Senior) => PHOTOSYNTHESIS_SENIOR,
            (Self::Mathematics, AgeBand::Primary) => MATH_PRIMARY,
            (Self::Mathematics, AgeBand::Secondary) => MATH_SECONDARY,
            (Self::Mathematics, AgeBand::Senior) => MATH_SENIOR,
            (Self::GeneralScience, AgeBand::Primary) => SCIENCE_PRIMARY,
            (Self::GeneralScience, AgeBand::Secondary) => SCIENCE_SECONDARY,
            (Self::GeneralScience, AgeBand::Senior) => SCIENCE_SENIOR,
        }
    }
}

/// Single-word keywords match whole words only (so "ai" does not fire on
/// "explain"); multi-word keywords match as phrases.
fn contains_keyword(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| {
        if keyword.contains(' ') {
            lowered.contains(keyword)
        } else {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *keyword)
        }
    })
}

/// Deterministic canned answer for (question, profile). Pure by construction:
/// repeated calls with the same inputs return the same text.
pub fn demo_answer(question: &str, profile: &StudentProfile) -> String {
    let lowered = question.to_lowercase();
    match (
        Topic::detect(&lowered),
        AgeBand::from_class_level(&profile.class_level),
    ) {
        (Some(topic), Some(band)) => topic.canned_text(band).to_string(),
        _ => GENERIC_FALLBACK.to_string(),
    }
}

const AI_PRIMARY: &str = "\
Great question! AI is short for Artificial Intelligence. It means teaching a \
computer to do clever things, a bit like how you learn at school.\n\n\
Imagine showing a computer thousands of pictures of cats and dogs. After a \
while it learns to tell them apart on its own, just like you learned to \
recognise animals. That is AI: computers learning from examples instead of \
being told every single rule.\n\n\
You already meet AI every day, like when a phone understands what you say to \
it. Keep asking questions like this one and maybe you will build one someday!";

const AI_SECONDARY: &str = "\
AI (Artificial Intelligence) is the field of making computers perform tasks \
that normally need human intelligence, such as recognising speech, \
translating languages or playing chess.\n\n\
Most modern AI works through machine learning: instead of programming exact \
rules, we feed a model lots of examples and it adjusts itself until it makes \
good predictions. For instance, a spam filter learns from thousands of \
labelled emails which words usually signal spam.\n\n\
The important idea is that the computer is not really thinking; it is finding \
patterns in data. That is why AI is very good at pattern-heavy jobs and still \
poor at common sense. It is one of the fastest growing areas of study, and \
the maths you learn now (especially statistics and algebra) is exactly what \
it is built on.";

const AI_SENIOR: &str = "\
Artificial Intelligence is the study of systems that perform tasks associated \
with human cognition: perception, language, reasoning and decision making. \
Modern AI is dominated by machine learning, where a parameterised model is \
fitted to data by minimising a loss function, usually with gradient descent.\n\n\
Deep learning stacks many layers of simple units (a neural network) so the \
model can learn its own features from raw inputs. That is what powers image \
recognition, speech-to-text and large language models. The key limitation to \
remember for exams and interviews alike: these models interpolate patterns in \
their training data, so data quality and bias directly shape their behaviour.\n\n\
If the area interests you, strengthen linear algebra, probability and \
calculus first; every serious AI course builds on those three.";

const PHOTOSYNTHESIS_PRIMARY: &str = "\
Photosynthesis is how plants make their own food. Isn't that amazing? They do \
not need a kitchen!\n\n\
A plant takes water from the soil through its roots, air through tiny holes \
in its leaves, and energy from sunlight. The green colour in leaves, called \
chlorophyll, catches the sunlight. Mixing these together, the leaf makes \
sugar for the plant to eat, and it releases the oxygen that we breathe.\n\n\
So every time you see a green leaf in the sun, remember: it is busy cooking \
food and making fresh air for you!";

const PHOTOSYNTHESIS_SECONDARY: &str = "\
Photosynthesis is the process by which green plants convert light energy into \
chemical energy stored in glucose.\n\n\
It happens in the chloroplasts, which contain the green pigment chlorophyll. \
The raw materials are carbon dioxide (taken in through stomata) and water \
(absorbed by roots). Using light energy, these are converted into glucose and \
oxygen. The overall word equation is: carbon dioxide + water, in the presence \
of sunlight and chlorophyll, gives glucose + oxygen.\n\n\
Two points examiners love: oxygen is a by-product released through the \
stomata, and the glucose is either used in respiration or stored as starch. \
Photosynthesis is also the entry point of energy into almost every food chain \
on Earth.";

const PHOTOSYNTHESIS_SENIOR: &str = "\
Photosynthesis converts light energy into chemical energy and proceeds in two \
stages inside the chloroplast.\n\n\
In the light-dependent reactions (thylakoid membranes), chlorophyll absorbs \
photons, water is split by photolysis releasing oxygen, and the energy is \
captured as ATP and NADPH. In the light-independent Calvin cycle (stroma), \
carbon dioxide is fixed by the enzyme RuBisCO and reduced to \
glyceraldehyde-3-phosphate using that ATP and NADPH, eventually forming \
glucose.\n\n\
The balanced equation is 6CO2 + 6H2O -> C6H12O6 + 6O2 (light, chlorophyll). \
For board exams, be ready to connect the two stages: the light reactions \
supply exactly the ATP and NADPH the Calvin cycle consumes, which is why the \
rate of one limits the other.";

const MATH_PRIMARY: &str = "\
Mathematics is like a puzzle game with numbers and shapes, and you get better \
at it the same way you get better at any game: by playing!\n\n\
Counting, adding, subtracting and sharing things equally are all maths. When \
you share 10 sweets between 5 friends, you are doing division. When you \
arrange blocks into a square, you are doing geometry.\n\n\
If a sum feels hard, try it with small numbers first, or draw a picture of \
it. Every maths champion started by counting on their fingers, so keep \
practising a little every day.";

const MATH_SECONDARY: &str = "\
Mathematics at your level is about moving from numbers to ideas: algebra lets \
you work with unknowns, and geometry lets you reason about space precisely.\n\n\
A good habit for any problem: write down what is given, what is asked, and \
which rule or formula links them. If the problem has an unknown, name it x \
and translate the sentence into an equation. Most exam questions are one \
honest translation plus two careful steps of working.\n\n\
Practise a mixed set of problems rather than repeating one type, and check \
answers by substituting them back. Marks are lost to skipped steps far more \
often than to hard concepts.";

const MATH_SENIOR: &str = "\
At the senior level, mathematics becomes a toolkit of connected ideas: \
algebra, coordinate geometry, trigonometry, calculus and \
probability-statistics, and board papers reward seeing the connections.\n\n\
Calculus deserves special attention: differentiation measures instantaneous \
change and integration accumulates it, and the two are inverses by the \
Fundamental Theorem of Calculus. Most application problems (maxima-minima, \
areas, rates) are about recognising which of the two the situation needs.\n\n\
Strategy that consistently pays: maintain a one-page formula sheet per \
chapter, solve previous years' papers under time, and for every mistake write \
one line about why it happened. Accuracy under time pressure is a skill you \
train, not a talent.";

const SCIENCE_PRIMARY: &str = "\
Science is the way we ask questions about the world and find answers by \
looking, touching and testing. You are already a scientist every time you ask \
why!\n\n\
Why does the sun rise? Why do things fall down when you drop them? Why does \
ice melt? Scientists answer questions like these by doing experiments: they \
try something, watch carefully what happens, and write it down.\n\n\
Next time you are curious about something, try observing it closely, and \
guess what will happen before you test it. That guess-and-check is exactly \
what real scientists do in their laboratories.";

const SCIENCE_SECONDARY: &str = "\
Science is organised curiosity: we observe, form a hypothesis, test it with a \
fair experiment, and accept or reject the idea based on the evidence.\n\n\
Your syllabus splits this into physics (matter, forces and energy), chemistry \
(substances and how they change) and biology (living things). They connect \
constantly: digestion is chemistry happening in a biological system, and \
electricity in your nerves is physics.\n\n\
When studying, focus on the reason behind each law rather than its statement \
alone; numericals and diagram questions become far easier when you can \
explain why something happens, not just that it happens.";

const SCIENCE_SENIOR: &str = "\
At the senior level, science shifts from descriptions to models with \
predictive power: Newtonian mechanics, the mole concept, chemical kinetics, \
genetics, and so on.\n\n\
Treat every chapter as a model with assumptions, a core equation or \
mechanism, and known limits. Examiners increasingly test exactly those edges: \
when does the ideal gas law fail, when is air resistance not negligible, why \
does a catalyst change the rate but not the equilibrium position.\n\n\
For entrance-exam preparation alongside boards, prioritise depth in NCERT \
first, then layer problem practice on top. A concept you can derive is worth \
ten you have memorised.";

const GENERIC_FALLBACK: &str = "\
That is a lovely question, and asking it is already the first step of \
learning!\n\n\
Right now I cannot reach my full knowledge to give you a detailed answer, but \
do not let that stop you. Try breaking the question into smaller parts, look \
it up in your textbook or ask your teacher, and note down what you find in \
your own words; explaining something in your own words is the fastest way to \
truly understand it.\n\n\
Come back and ask me again in a little while, and keep that curiosity shining!";
