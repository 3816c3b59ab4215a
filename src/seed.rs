//! Demo data for local development.

use cookbook_recipe::{RecipeInput, category::CategoryInput, comment::CommentInput};
use cookbook_shared::{Actor, State};
use cookbook_user::RegisterInput;

const CATEGORIES: [(&str, &str); 10] = [
    ("Śniadania", "sniadania"),
    ("Obiady", "obiady"),
    ("Kolacje", "kolacje"),
    ("Desery", "desery"),
    ("Przekąski", "przekaski"),
    ("Zupy", "zupy"),
    ("Sałatki", "salatki"),
    ("Wegetariańskie", "wegetarianskie"),
    ("Wegańskie", "weganskie"),
    ("Napoje", "napoje"),
];

struct DemoUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    is_admin: bool,
}

const USERS: [DemoUser; 4] = [
    DemoUser {
        name: "Administrator",
        email: "admin@admin.com",
        password: "Administrator",
        is_admin: true,
    },
    DemoUser {
        name: "Test User",
        email: "test@test.com",
        password: "KontoTest11",
        is_admin: false,
    },
    DemoUser {
        name: "Wojciech Ross",
        email: "wojciech.ross@wr.com",
        password: "WojRoss123",
        is_admin: false,
    },
    DemoUser {
        name: "Agnieszka Niemieszka",
        email: "agnieszka.niemieszka@an.com",
        password: "AgnieszkaNiemieszka123",
        is_admin: false,
    },
];

struct DemoRecipe {
    title: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static str,
    cooking_time: i64,
    servings: i64,
    difficulty: &'static str,
    category: &'static str,
}

const RECIPES: [DemoRecipe; 6] = [
    DemoRecipe {
        title: "Jajecznica na maśle",
        description: "Klasyczna jajecznica na maśle, idealna na śniadanie.",
        ingredients: &["3 jajka", "1 łyżka masła", "sól", "pieprz", "szczypiorek"],
        instructions: "1. Rozbij jajka do miski i lekko roztrzep.\n2. Rozpuść masło na patelni.\n3. Wlej jajka i mieszaj na małym ogniu.\n4. Dopraw solą i pieprzem.\n5. Posyp szczypiorkiem.",
        cooking_time: 10,
        servings: 2,
        difficulty: "easy",
        category: "sniadania",
    },
    DemoRecipe {
        title: "Spaghetti Bolognese",
        description: "Tradycyjny włoski makaron z sosem mięsnym.",
        ingredients: &[
            "500g mielonej wołowiny",
            "400g makaronu spaghetti",
            "400g pomidorów z puszki",
            "1 cebula",
            "2 ząbki czosnku",
            "oliwa",
            "bazylia",
        ],
        instructions: "1. Podsmaż cebulę i czosnek na oliwie.\n2. Dodaj mięso i smaż do zrumienienia.\n3. Wlej pomidory i gotuj 30 minut.\n4. Ugotuj makaron al dente.\n5. Podawaj makaron polany sosem.",
        cooking_time: 45,
        servings: 4,
        difficulty: "medium",
        category: "obiady",
    },
    DemoRecipe {
        title: "Sernik na zimno",
        description: "Kremowy sernik bez pieczenia, idealny na lato.",
        ingredients: &[
            "500g serka mascarpone",
            "200g herbatników",
            "100g masła",
            "200ml śmietanki 30%",
            "100g cukru pudru",
            "1 cytryna",
            "żelatyna",
        ],
        instructions: "1. Pokrusz herbatniki i wymieszaj z rozpuszczonym masłem.\n2. Wyłóż spód tortownicy.\n3. Ubij śmietankę z cukrem.\n4. Dodaj mascarpone i sok z cytryny.\n5. Wylej na spód i schłódź 4 godziny.",
        cooking_time: 30,
        servings: 8,
        difficulty: "medium",
        category: "desery",
    },
    DemoRecipe {
        title: "Zupa pomidorowa",
        description: "Domowa zupa pomidorowa z makaronem.",
        ingredients: &["1kg pomidorów", "1 litr bulionu", "1 cebula", "2 ząbki czosnku", "śmietana", "makaron"],
        instructions: "1. Sparzyć pomidory i obrać ze skórki.\n2. Podsmaż cebulę i czosnek.\n3. Dodaj pomidory i gotuj 15 minut.\n4. Zmiksuj i dodaj bulion.\n5. Dopraw i podawaj z makaronem.",
        cooking_time: 40,
        servings: 6,
        difficulty: "easy",
        category: "zupy",
    },
    DemoRecipe {
        title: "Curry z warzywami",
        description: "Aromatyczne wegańskie curry z mlekiem kokosowym.",
        ingredients: &[
            "400ml mleka kokosowego",
            "2 łyżki pasty curry",
            "1 bakłażan",
            "1 papryka",
            "200g ciecierzycy",
            "szpinak",
            "ryż",
        ],
        instructions: "1. Podsmaż pastę curry.\n2. Dodaj warzywa i smaż 5 minut.\n3. Wlej mleko kokosowe.\n4. Dodaj ciecierzycę i gotuj 15 minut.\n5. Dodaj szpinak i podawaj z ryżem.",
        cooking_time: 35,
        servings: 4,
        difficulty: "hard",
        category: "weganskie",
    },
    DemoRecipe {
        title: "Lemoniada domowa",
        description: "Orzeźwiający napój z cytryn.",
        ingredients: &["4 cytryny", "150g cukru", "1 litr wody", "mięta", "kostki lodu"],
        instructions: "1. Wyciśnij sok z cytryn.\n2. Rozpuść cukier w ciepłej wodzie.\n3. Połącz z sokiem.\n4. Dodaj zimną wodę i lód.\n5. Udekoruj miętą.",
        cooking_time: 15,
        servings: 6,
        difficulty: "easy",
        category: "napoje",
    },
];

const COMMENTS: [&str; 6] = [
    "Świetny przepis! Na pewno spróbuję.",
    "Robiłam wczoraj, wyszło pyszne!",
    "Łatwe i szybkie do przygotowania.",
    "Czy można zamienić masło na oliwę?",
    "Dziękuję za przepis!",
    "Polecam dodać trochę chili.",
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub users: usize,
    pub recipes: usize,
    pub comments: usize,
    pub likes: usize,
}

/// Inserts demo categories, users, recipes, comments and likes.
///
/// Does nothing when the admin account already exists, so running it twice
/// leaves the database untouched.
pub async fn seed(pool: sqlx::SqlitePool) -> anyhow::Result<SeedReport> {
    let state = State::single(pool);
    let users = cookbook_user::Command::new(state.clone());
    let recipes = cookbook_recipe::Command::new(state);
    let mut report = SeedReport::default();

    if users.find_by_email(USERS[0].email).await?.is_some() {
        tracing::warn!("database already seeded, skipping");
        return Ok(report);
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, slug) in CATEGORIES {
        let category = recipes
            .create_category(CategoryInput {
                name: Some(name.to_owned()),
                slug: Some(slug.to_owned()),
            })
            .await?;
        category_ids.push((slug, category.id));
        report.categories += 1;
    }

    let mut actors = Vec::with_capacity(USERS.len());
    for user in &USERS {
        let row = users
            .create_user(
                RegisterInput {
                    name: user.name.to_owned(),
                    email: user.email.to_owned(),
                    password: user.password.to_owned(),
                    password_confirmation: user.password.to_owned(),
                },
                user.is_admin,
            )
            .await?;
        actors.push(Actor {
            id: row.id,
            is_admin: row.is_admin,
        });
        report.users += 1;
    }

    for (i, demo) in RECIPES.iter().enumerate() {
        let author = actors[i % actors.len()];
        let category_id = category_ids
            .iter()
            .find(|(slug, _)| *slug == demo.category)
            .map(|(_, id)| *id);

        let recipe = recipes
            .create(
                author,
                RecipeInput {
                    category_id: Some(category_id),
                    title: Some(demo.title.to_owned()),
                    description: Some(demo.description.to_owned()),
                    ingredients: Some(demo.ingredients.iter().map(|i| (*i).to_owned()).collect()),
                    instructions: Some(demo.instructions.to_owned()),
                    cooking_time: Some(demo.cooking_time),
                    servings: Some(demo.servings),
                    difficulty: Some(demo.difficulty.to_owned()),
                    ..Default::default()
                },
            )
            .await?;
        report.recipes += 1;

        // Every other user comments, a rotating subset likes.
        for (j, actor) in actors.iter().enumerate() {
            if actor.id == author.id {
                continue;
            }

            if (i + j) % 2 == 0 {
                recipes
                    .create_comment(
                        *actor,
                        recipe.id,
                        CommentInput {
                            content: COMMENTS[(i + j) % COMMENTS.len()].to_owned(),
                        },
                    )
                    .await?;
                report.comments += 1;
            }

            if (i + j) % 3 != 0 {
                recipes.like(actor.id, recipe.id).await?;
                report.likes += 1;
            }
        }
    }

    tracing::info!(
        categories = report.categories,
        users = report.users,
        recipes = report.recipes,
        comments = report.comments,
        likes = report.likes,
        "database seeded"
    );

    Ok(report)
}
