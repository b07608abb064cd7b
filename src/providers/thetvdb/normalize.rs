use std::collections::HashSet;

use super::{TvdbCredit, TvdbPerson, SOURCE};
use crate::model::{namespaced_id, Actor};
use crate::normalization::lists::{first_sentence, owned};
use crate::normalization::{
    dedup_titles, pad_to_minimum, resolve_age, truncate_with_ellipsis, AgeRange, BucketScale,
};
use crate::providers::RecordNormalizer;

pub const PLACEHOLDER_IMAGE: &str = "https://artworks.thetvdb.com/banners/person/missing.jpg";

const AGE_RANGE: AgeRange = AgeRange::new(25, 54);
const FILMOGRAPHY_CAP: usize = 12;

/// Keyed on the number of distinct series.
const NET_WORTH: BucketScale = BucketScale::new(
    &[
        (15.0, "$8M+"),
        (10.0, "$3M-8M"),
        (5.0, "$1M-3M"),
        (2.0, "$200k-1M"),
    ],
    "$100k-500k",
);

const FILLER_FACTS: &[&str] = &[
    "📺 Television star",
    "🎬 Professional actor",
    "⭐ Recognisable face",
    "🌟 Talented performer",
    "🎭 Master of TV roles",
    "💫 Fan favourite",
    "🏆 Seasoned professional",
    "🎪 Versatile artist",
];

pub struct TvdbNormalizer {
    fun_facts_min: usize,
}

impl TvdbNormalizer {
    pub fn new(fun_facts_min: usize) -> Self {
        Self { fun_facts_min }
    }
}

/// Distinct works among the credits; credits without a work id count alone.
fn distinct_works(credits: &[TvdbCredit]) -> usize {
    let keyed: HashSet<u64> = credits.iter().filter_map(TvdbCredit::work_key).collect();
    keyed.len() + credits.iter().filter(|c| c.work_key().is_none()).count()
}

impl RecordNormalizer for TvdbNormalizer {
    type Person = TvdbPerson;
    type Credit = TvdbCredit;

    fn normalize(&self, person: &TvdbPerson, credits: Option<&[TvdbCredit]>) -> Actor {
        // Extended records carry their own characters.
        let credits = credits
            .filter(|c| !c.is_empty())
            .unwrap_or(person.characters.as_slice());
        let id = namespaced_id(SOURCE, person.id);
        let bio = person.biography_text();
        let birth_place = person
            .birth_place
            .as_deref()
            .filter(|p| !p.trim().is_empty());

        let filmography = dedup_titles(credits.iter().filter_map(TvdbCredit::work_title), FILMOGRAPHY_CAP);
        let works = distinct_works(credits);
        let featured = credits.iter().filter(|c| c.is_featured == Some(true)).count();

        let image = person
            .image
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        let images = person
            .image
            .iter()
            .filter(|url| !url.trim().is_empty())
            .cloned()
            .collect();

        let mut awards: Vec<String> = person
            .awards
            .iter()
            .take(3)
            .map(|a| match a.year {
                Some(year) => format!("🏆 {} ({year})", a.name),
                None => format!("🏆 {}", a.name),
            })
            .collect();
        if works > 8 {
            awards.push("📺 Television veteran".to_string());
        }
        if featured > 3 {
            awards.push("⭐ Recognised for leading roles".to_string());
        }
        if works > 15 {
            awards.push("🎭 TV Hall of Fame contender".to_string());
        }
        if awards.is_empty() {
            awards = owned(&[
                "🎬 Professional TV actor",
                "🌟 Recognisable in the industry",
                "📺 Television talent",
            ]);
        }
        awards.truncate(4);

        let trivia = vec![
            bio.map(|b| truncate_with_ellipsis(b, 200)).unwrap_or_else(|| {
                format!(
                    "TV actor known for {}",
                    filmography.first().map(String::as_str).unwrap_or("many series")
                )
            }),
            format!("Born: {}", person.birth.as_deref().unwrap_or("date unknown")),
            format!("Series: {works}"),
            format!("Birthplace: {}", birth_place.unwrap_or("Unknown")),
        ];

        let quotes = vec![
            bio.and_then(first_sentence)
                .unwrap_or_else(|| "Television is my passion.".to_string()),
            "Every role is a new challenge.".to_string(),
            "Series are changing how stories are told.".to_string(),
        ];

        Actor {
            id: id.clone(),
            name: person.name.clone(),
            age: resolve_age(person.birth.as_deref(), &id, AGE_RANGE),
            birth_place: birth_place.unwrap_or("Unknown").to_string(),
            image,
            images,
            filmography,
            music: Vec::new(),
            books: Vec::new(),
            awards,
            trivia,
            fun_facts: self.fun_facts(person, credits, works, featured),
            relationships: if person.death.is_some() {
                vec!["Deceased".to_string()]
            } else {
                vec!["Relationship status unknown".to_string()]
            },
            net_worth: NET_WORTH.label(works as f64).to_string(),
            hobbies: owned(&["Acting", "Television", "Entertainment", "Art"]),
            social_media: owned(&["Private profiles", "TheTVDB verified"]),
            upcoming_projects: owned(&[
                "New TV projects",
                "Castings in progress",
                "Work with TV networks",
            ]),
            controversies: owned(&["No major scandals"]),
            quotes,
            wiki_data: None,
            source_payload: serde_json::to_value(person).ok(),
        }
    }
}

impl TvdbNormalizer {
    fn fun_facts(
        &self,
        person: &TvdbPerson,
        credits: &[TvdbCredit],
        works: usize,
        featured: usize,
    ) -> Vec<String> {
        let mut facts = Vec::new();
        match person.gender {
            Some(1) => facts.push("👤 Actor".to_string()),
            Some(2) => facts.push("👤 Actress".to_string()),
            _ => {}
        }
        if let Some(place) = person.birth_place.as_deref().filter(|p| !p.trim().is_empty()) {
            facts.push(format!("🌍 Born in {place}"));
        }
        facts.push(match works {
            n if n > 10 => format!("📺 {n}+ TV series!"),
            n if n > 5 => format!("🎬 {n} series in the career"),
            n if n > 2 => format!("🌟 {n} TV projects"),
            _ => "🎭 Developing TV career".to_string(),
        });
        if featured > 0 {
            facts.push(format!("⭐ {featured} leading roles"));
        }
        if let Some(bio) = person.biography_text() {
            facts.push(format!("📚 {}", truncate_with_ellipsis(bio, 80)));
        }
        if !person.awards.is_empty() {
            facts.push(format!("🏆 {} awards", person.awards.len()));
        }
        if credits.len() > 3 {
            facts.push(format!("🎪 Played {} characters", credits.len()));
        }
        if let Some(alias) = person.aliases.first() {
            facts.push(format!("🏷️ Also known as: {}", alias.name));
        }
        pad_to_minimum(facts, FILLER_FACTS, self.fun_facts_min, &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn person(value: serde_json::Value) -> TvdbPerson {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn search_record_gets_defaults() {
        let actor = TvdbNormalizer::new(8).normalize(&person(json!({"id": 5, "name": "Plain"})), None);
        assert_eq!(actor.id, "tvdb-5");
        assert_eq!(actor.image, PLACEHOLDER_IMAGE);
        assert!(actor.images.is_empty());
        assert_eq!(actor.birth_place, "Unknown");
        assert_eq!(actor.net_worth, "$100k-500k");
        assert_eq!(actor.awards.len(), 3);
        assert_eq!(actor.fun_facts.len(), 8);
        assert!((25..=54).contains(&actor.age));
        assert_eq!(actor.trivia[0], "TV actor known for many series");
    }

    #[test]
    fn credits_drive_counts() {
        let credits: Vec<TvdbCredit> = (0..12)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i, "name": format!("Role {i}"), "seriesId": i % 9,
                    "series": {"name": format!("Series {}", i % 9)}, "isFeatured": i < 5
                }))
                .unwrap()
            })
            .collect();
        let p = person(json!({
            "id": 1, "name": "Busy", "birth": "1975-04-02", "birthPlace": "Santiago, Chile",
            "gender": 1, "image": "https://art/p.jpg",
            "aliases": [{"name": "P.P."}],
            "awards": [{"name": "Emmy", "year": 2021}, {"name": "SAG"}]
        }));
        let actor = TvdbNormalizer::new(8).normalize(&p, Some(&credits));

        assert_eq!(actor.filmography.len(), 9);
        assert_eq!(actor.net_worth, "$1M-3M");
        assert_eq!(actor.image, "https://art/p.jpg");
        assert_eq!(actor.images, vec!["https://art/p.jpg"]);
        assert_eq!(actor.birth_place, "Santiago, Chile");
        assert_eq!(
            actor.awards,
            vec![
                "🏆 Emmy (2021)",
                "🏆 SAG",
                "📺 Television veteran",
                "⭐ Recognised for leading roles"
            ]
        );
        assert!(actor.fun_facts.contains(&"👤 Actor".to_string()));
        assert!(actor.fun_facts.contains(&"🏷️ Also known as: P.P.".to_string()));
        assert!(actor.fun_facts.len() >= 8);
    }

    #[test]
    fn extended_characters_are_used_without_separate_credits() {
        let p = person(json!({
            "id": 2, "name": "Ext",
            "characters": [{"id": 1, "seriesId": 4}, {"id": 2, "series": {"name": "Named"}}]
        }));
        let actor = TvdbNormalizer::new(8).normalize(&p, Some(&[][..]));
        assert_eq!(actor.filmography, vec!["TV Series 4", "Named"]);
        assert_eq!(actor.trivia[2], "Series: 2");
    }

    #[test]
    fn repeated_normalization_keeps_identity_fields() {
        let credits: Vec<TvdbCredit> = serde_json::from_value(json!([
            {"id": 1, "seriesId": 3, "series": {"name": "Second Wind"}},
            {"id": 2, "seriesId": 4, "series": {"name": "First Light"}, "isFeatured": true}
        ]))
        .unwrap();
        // no birth date, so the age comes from the estimate
        let p = person(json!({"id": 44, "name": "Twice", "birthPlace": "Lyon, France"}));
        let n = TvdbNormalizer::new(8);
        let a = n.normalize(&p, Some(&credits));
        let b = n.normalize(&p, Some(&credits));
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.age, b.age);
        assert_eq!(a.birth_place, b.birth_place);
        assert_eq!(a.filmography, vec!["Second Wind", "First Light"]);
        assert_eq!(a.filmography, b.filmography);
        assert_eq!(a.fun_facts.len(), b.fun_facts.len());
    }
}
