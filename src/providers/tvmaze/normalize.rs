use std::collections::HashSet;

use chrono::{NaiveDate, Utc};

use super::{TvMazeCastCredit, TvMazePerson, TvMazeShow, SOURCE};
use crate::model::{namespaced_id, Actor};
use crate::normalization::age::parse_birth_date;
use crate::normalization::lists::{first_sentence, owned};
use crate::normalization::{
    dedup_titles, pad_to_minimum, resolve_age, truncate_with_ellipsis, AgeRange, BucketScale,
};
use crate::providers::RecordNormalizer;

pub const PLACEHOLDER_IMAGE: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ac/No_image_available.svg/300px-No_image_available.svg.png";

const AGE_RANGE: AgeRange = AgeRange::new(25, 49);
const FILMOGRAPHY_CAP: usize = 15;
const IMAGES_CAP: usize = 5;
const HIGH_RATING: f64 = 8.5;

const NET_WORTH: BucketScale = BucketScale::new(
    &[
        (25.0, "$10M+"),
        (15.0, "$5M-10M"),
        (10.0, "$1M-5M"),
        (5.0, "$500k-1M"),
    ],
    "$50k-200k",
);

const FILLER_FACTS: &[&str] = &[
    "✨ Star of the screen!",
    "🎪 Always in the spotlight",
    "💎 Talent and charisma",
    "🌈 Pop-culture icon",
    "🔥 Stirs up the fans",
    "💯 Audience favourite",
    "🎭 Master of the craft",
    "📸 Everyone's crush",
    "🎬 The future of Hollywood",
    "💫 Undeniable talent",
];

pub struct TvMazeNormalizer {
    fun_facts_min: usize,
}

impl TvMazeNormalizer {
    pub fn new(fun_facts_min: usize) -> Self {
        Self { fun_facts_min }
    }
}

impl RecordNormalizer for TvMazeNormalizer {
    type Person = TvMazePerson;
    type Credit = TvMazeCastCredit;

    fn normalize(&self, person: &TvMazePerson, credits: Option<&[TvMazeCastCredit]>) -> Actor {
        let credits = credits.unwrap_or_default();
        let shows: Vec<&TvMazeShow> = credits.iter().filter_map(|c| c.show()).collect();
        let id = namespaced_id(SOURCE, person.id);
        let wiki = person.wiki.as_ref();
        let extract = wiki.and_then(|w| w.extract.as_deref()).filter(|e| !e.trim().is_empty());
        let country = person.country.as_ref().map(|c| c.name.as_str());

        let filmography = dedup_titles(shows.iter().map(|s| s.name.as_str()), FILMOGRAPHY_CAP);
        let project_count = shows.len();

        let person_original = person.image.as_ref().and_then(|i| i.original.clone());
        let person_medium = person.image.as_ref().and_then(|i| i.medium.clone());
        let wiki_original = wiki.and_then(|w| w.originalimage.as_ref()).map(|i| i.source.clone());
        let wiki_thumb = wiki.and_then(|w| w.thumbnail.as_ref()).map(|i| i.source.clone());

        let image = [&person_original, &wiki_original, &person_medium, &wiki_thumb]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        let extra_wiki_images = wiki.map(|w| w.images.iter().take(4)).into_iter().flatten();
        let images = dedup_titles(
            [person_original, person_medium, wiki_original, wiki_thumb]
                .into_iter()
                .flatten()
                .chain(extra_wiki_images.cloned()),
            IMAGES_CAP,
        );

        let trivia = vec![
            extract
                .map(|e| truncate_with_ellipsis(e, 250))
                .unwrap_or_else(|| {
                    format!(
                        "Known for {}",
                        filmography.first().map(String::as_str).unwrap_or("many productions")
                    )
                }),
            format!("Born: {}", person.birthday.as_deref().unwrap_or("date unknown")),
            format!("Projects: {project_count}"),
            format!("Origin: {}", country.unwrap_or("USA")),
        ];

        let quotes = vec![
            extract
                .and_then(first_sentence)
                .unwrap_or_else(|| "Acting is my passion and my way of life.".to_string()),
            "Every role is a new challenge.".to_string(),
            "Cinema changes the world.".to_string(),
        ];

        Actor {
            id: id.clone(),
            name: person.name.clone(),
            age: resolve_age(person.birthday.as_deref(), &id, AGE_RANGE),
            birth_place: country.unwrap_or("Hollywood, USA").to_string(),
            image,
            images,
            filmography,
            music: Vec::new(),
            books: Vec::new(),
            awards: awards(&shows, Utc::now().date_naive()),
            trivia,
            fun_facts: self.fun_facts(person, &shows, extract),
            relationships: if person.deathday.is_some() {
                vec!["Deceased".to_string()]
            } else {
                vec!["Relationship status unknown".to_string()]
            },
            net_worth: NET_WORTH.label(project_count as f64).to_string(),
            hobbies: owned(&["Acting", "Cinema", "Art", "Fitness"]),
            social_media: owned(&["Private profiles", "Instagram verified"]),
            upcoming_projects: owned(&["New film projects", "Castings in progress"]),
            controversies: owned(&["No major scandals"]),
            quotes,
            wiki_data: person.wiki.clone(),
            source_payload: serde_json::to_value(person).ok(),
        }
    }
}

impl TvMazeNormalizer {
    fn fun_facts(
        &self,
        person: &TvMazePerson,
        shows: &[&TvMazeShow],
        extract: Option<&str>,
    ) -> Vec<String> {
        let mut facts = Vec::new();
        if let Some(gender) = person.gender.as_deref() {
            let label = if gender.eq_ignore_ascii_case("male") { "Male" } else { "Female" };
            facts.push(format!("👤 {label}"));
        }
        if let Some(country) = &person.country {
            facts.push(format!("🌍 Origin: {}", country.name));
        }
        let count = shows.len();
        facts.push(match count {
            n if n > 15 => format!("🎭 {n}+ roles in the career!"),
            n if n > 8 => format!("⭐ {n} notable roles"),
            n if n > 3 => format!("🌟 {n} screen projects"),
            _ => "🎬 Rising star".to_string(),
        });
        if let Some(extract) = extract {
            facts.push(format!("📚 {}", truncate_with_ellipsis(extract, 120)));
        }
        let kinds = dedup_titles(
            shows.iter().map(|s| s.kind.as_deref().unwrap_or("Series")),
            usize::MAX,
        );
        if kinds.len() > 1 {
            facts.push(format!("🎬 Versatile: {}", kinds.join(", ")));
        }
        let high_rated = shows.iter().filter(|s| s.rating() > HIGH_RATING).count();
        if high_rated > 0 {
            facts.push(format!("🏆 {high_rated} highly rated projects"));
        }
        let genres = dedup_titles(shows.iter().flat_map(|s| s.genres.iter()), 3);
        if !genres.is_empty() {
            facts.push(format!("🎪 Genres: {}", genres.join(", ")));
        }
        pad_to_minimum(facts, FILLER_FACTS, self.fun_facts_min, &mut rand::thread_rng())
    }
}

fn awards(shows: &[&TvMazeShow], today: NaiveDate) -> Vec<String> {
    let mut awards = Vec::new();
    let high_rated = shows.iter().filter(|s| s.rating() > HIGH_RATING).count();
    if high_rated > 3 {
        awards.push("🏆 Star of hit productions".to_string());
        awards.push("⭐ Critically acclaimed talent".to_string());
    } else if high_rated > 1 {
        awards.push("🌟 Appearances in hit projects".to_string());
    } else if high_rated > 0 {
        awards.push("✨ A hit in the portfolio".to_string());
    }

    if shows.iter().any(|s| ran_longer_than_three_years(s, today)) {
        awards.push("📺 Star of long-running series".to_string());
    }

    let genres: HashSet<&str> = shows
        .iter()
        .flat_map(|s| s.genres.iter().map(String::as_str))
        .collect();
    if genres.len() > 4 {
        awards.push("🎭 Versatile performer".to_string());
    }

    if awards.is_empty() {
        awards.push("🎬 Professional actor".to_string());
        awards.push("🌟 Recognisable talent".to_string());
    }
    awards.truncate(4);
    awards
}

fn ran_longer_than_three_years(show: &TvMazeShow, today: NaiveDate) -> bool {
    let Some(premiered) = show.premiered.as_deref().and_then(parse_birth_date) else {
        return false;
    };
    let ended = show
        .ended
        .as_deref()
        .and_then(parse_birth_date)
        .unwrap_or(today);
    (ended - premiered).num_days() > 3 * 365
}
