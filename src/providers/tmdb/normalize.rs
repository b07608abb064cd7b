use super::{TmdbPerson, TmdbWork, IMAGE_BASE_URL, SOURCE};
use crate::model::{namespaced_id, Actor};
use crate::normalization::lists::owned;
use crate::normalization::{
    dedup_titles, pad_to_minimum, resolve_age, truncate_with_ellipsis, AgeRange, BucketScale,
};
use crate::providers::RecordNormalizer;

pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1494790108755-2616c96f29f5?w=400&h=600&fit=crop";

const AGE_RANGE: AgeRange = AgeRange::new(25, 54);
const FILMOGRAPHY_CAP: usize = 12;
const CREDITS_CONSIDERED: usize = 15;
const HIGH_RATING: f64 = 8.0;

/// Keyed on TMDB popularity.
const NET_WORTH: BucketScale = BucketScale::new(
    &[(80.0, "$50M+"), (50.0, "$10-50M"), (20.0, "$5-10M")],
    "$1-5M",
);

const FILLER_FACTS: &[&str] = &[
    "✨ Star lifestyle!",
    "🎪 Always in the spotlight",
    "💎 Luxury lifestyle",
    "🌈 Pop-culture icon",
    "🔥 Stirs up the fans",
    "💯 Number one in fans' hearts",
];

const QUOTES: &[&str] = &[
    "Acting is my passion and my way of life.",
    "Every role is a new challenge.",
    "Cinema changes the world, one film at a time.",
    "Working with an audience is an incredible experience.",
    "Art connects people all over the world.",
    "Dreams come true when you don't give up.",
    "Every day brings new opportunities.",
];

pub struct TmdbNormalizer {
    fun_facts_min: usize,
}

impl TmdbNormalizer {
    pub fn new(fun_facts_min: usize) -> Self {
        Self { fun_facts_min }
    }
}

pub fn image_url(profile_path: Option<&str>) -> String {
    match profile_path.filter(|p| !p.trim().is_empty()) {
        Some(path) => format!("{IMAGE_BASE_URL}{path}"),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

impl RecordNormalizer for TmdbNormalizer {
    type Person = TmdbPerson;
    type Credit = TmdbWork;

    fn normalize(&self, person: &TmdbPerson, credits: Option<&[TmdbWork]>) -> Actor {
        let id = namespaced_id(SOURCE, person.id);
        let bio = person.biography.as_deref().filter(|b| !b.trim().is_empty());
        let department = person.department();

        let filmography = dedup_titles(
            person
                .known_for
                .iter()
                .chain(credits.unwrap_or_default().iter().take(CREDITS_CONSIDERED))
                .filter_map(TmdbWork::label),
            FILMOGRAPHY_CAP,
        );

        let mut social_media: Vec<String> = person
            .external_ids
            .iter()
            .flat_map(|ids| [ids.instagram_id.as_deref(), ids.twitter_id.as_deref()])
            .flatten()
            .filter(|handle| !handle.trim().is_empty())
            .map(|handle| format!("@{handle}"))
            .collect();
        if social_media.is_empty() {
            social_media.push("Private accounts".to_string());
        }

        let image = image_url(person.profile_path.as_deref());
        let images = if image == PLACEHOLDER_IMAGE {
            Vec::new()
        } else {
            vec![image.clone()]
        };

        let trivia = vec![
            bio.map(|b| truncate_with_ellipsis(b, 150))
                .unwrap_or_else(|| format!("Specialises in: {department}")),
            format!("Database popularity: {:.1}/100", person.popularity),
            match person.also_known_as.first() {
                Some(alias) => format!("Also known as: {alias}"),
                None => "One of the most recognisable faces".to_string(),
            },
        ];

        Actor {
            id: id.clone(),
            name: person.name.clone(),
            age: resolve_age(person.birthday.as_deref(), &id, AGE_RANGE),
            birth_place: person
                .place_of_birth
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| "Unknown place".to_string()),
            image,
            images,
            filmography,
            music: if department == "Sound" {
                owned(&["Soundtrack work", "Music production"])
            } else {
                Vec::new()
            },
            books: Vec::new(),
            awards: awards(person),
            trivia,
            fun_facts: self.fun_facts(person),
            relationships: if person.deathday.is_some() {
                vec!["Deceased".to_string()]
            } else {
                vec!["Private life kept private".to_string()]
            },
            net_worth: NET_WORTH.label(person.popularity).to_string(),
            hobbies: owned(&["Acting", "Travel", "Art"]),
            social_media,
            upcoming_projects: owned(&[
                "New projects in production",
                "A mystery film",
                "Work with top directors",
            ]),
            controversies: owned(&["No major scandals", "Professional career"]),
            quotes: vec![QUOTES[(person.id % QUOTES.len() as u64) as usize].to_string()],
            wiki_data: None,
            source_payload: serde_json::to_value(person).ok(),
        }
    }
}

impl TmdbNormalizer {
    fn fun_facts(&self, person: &TmdbPerson) -> Vec<String> {
        let mut facts = Vec::new();
        let popularity = person.popularity;
        facts.push(match popularity {
            p if p > 50.0 => format!("🔥 Popularity: {p:.1}, a mega star!"),
            p if p > 20.0 => format!("⭐ Popularity: {p:.1}, a rising star!"),
            p => format!("💫 Popularity: {p:.1}, a hidden talent!"),
        });
        facts.push(match person.department() {
            "Acting" => "🎭 Professional actor".to_string(),
            "Directing" => "🎬 Talented director".to_string(),
            other => format!("🎨 Specialist: {other}"),
        });
        match person.known_for.len() {
            n if n > 5 => facts.push(format!("🎥 {n}+ well-known productions!")),
            0 => {}
            n => facts.push(format!("🌟 {n} hits in the portfolio")),
        }
        if person.biography.as_deref().is_some_and(|b| b.chars().count() > 100) {
            facts.push("📚 A rich career history".to_string());
        }
        if let Some(place) = person.place_of_birth.as_deref().filter(|p| !p.trim().is_empty()) {
            let country = place.rsplit(',').next().map(str::trim).unwrap_or(place);
            facts.push(format!("🌍 Origin: {country}"));
        }
        if person
            .external_ids
            .as_ref()
            .is_some_and(|ids| ids.instagram_id.is_some())
        {
            facts.push("📱 Active on Instagram!".to_string());
        }
        pad_to_minimum(facts, FILLER_FACTS, self.fun_facts_min, &mut rand::thread_rng())
    }
}

fn awards(person: &TmdbPerson) -> Vec<String> {
    let mut awards = Vec::new();
    match person.popularity {
        p if p > 80.0 => {
            awards.push("🏆 TMDB Most Popular Star".to_string());
            awards.push("⭐ Global Recognition Award".to_string());
        }
        p if p > 50.0 => {
            awards.push("🌟 TMDB Rising Star".to_string());
            awards.push("🎭 Outstanding Performance".to_string());
        }
        p if p > 20.0 => awards.push("💫 TMDB Talent Award".to_string()),
        _ => {}
    }
    match person.department() {
        "Acting" => awards.push("🎬 Best Performance Nominee".to_string()),
        "Directing" => awards.push("🎥 Excellence in Directing".to_string()),
        _ => {}
    }
    if person.known_for.iter().any(|w| w.rating() > HIGH_RATING) {
        awards.push("🏅 Critics Choice Recognition".to_string());
    }
    if awards.is_empty() {
        awards.push("🎭 Industry Professional".to_string());
    }
    awards
}
