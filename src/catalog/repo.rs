use lazy_static::lazy_static;

use crate::catalog::repo_types::{FoodItem, Recipe, RecipeCategory, ServingSize, Vitamin};

lazy_static! {
    static ref FOODS: Vec<FoodItem> = build_foods();
    static ref RECIPES: Vec<Recipe> = build_recipes();
}

pub fn foods() -> &'static [FoodItem] {
    &FOODS
}

pub fn recipes() -> &'static [Recipe] {
    &RECIPES
}

pub fn food_by_id(id: &str) -> Option<&'static FoodItem> {
    FOODS.iter().find(|f| f.id == id)
}

pub fn recipe_by_id(id: &str) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.id == id)
}

/// Case-insensitive substring match on the name. Names starting with the
/// query come first; ties keep catalog order. A blank query matches nothing.
pub fn search_foods(query: &str) -> Vec<&'static FoodItem> {
    rank(FOODS.iter(), query, |f| f.name.as_str(), |_| false)
}

/// Like [`search_foods`], also matching tags and descriptions (ranked after
/// name matches).
pub fn search_recipes(query: &str) -> Vec<&'static Recipe> {
    rank(RECIPES.iter(), query, |r| r.name.as_str(), |r| {
        let q = query.trim().to_lowercase();
        r.description.to_lowercase().contains(&q) || r.tags.iter().any(|t| t.to_lowercase().contains(&q))
    })
}

pub fn recipes_by_category(category: RecipeCategory) -> Vec<&'static Recipe> {
    RECIPES.iter().filter(|r| r.category == category).collect()
}

fn rank<'a, T, I, N, E>(items: I, query: &str, name: N, extra: E) -> Vec<&'a T>
where
    I: Iterator<Item = &'a T>,
    N: Fn(&T) -> &str,
    E: Fn(&T) -> bool,
{
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    let mut prefix = Vec::new();
    let mut inner = Vec::new();
    let mut other = Vec::new();
    for item in items {
        let lowered = name(item).to_lowercase();
        if lowered.starts_with(&q) {
            prefix.push(item);
        } else if lowered.contains(&q) {
            inner.push(item);
        } else if extra(item) {
            other.push(item);
        }
    }
    prefix.extend(inner);
    prefix.extend(other);
    prefix
}

fn servings(sizes: &[(&str, f64)]) -> Vec<ServingSize> {
    sizes
        .iter()
        .map(|(label, grams)| ServingSize {
            label: label.to_string(),
            grams: *grams,
        })
        .collect()
}

fn vitamins(list: &[(&str, &str, u32)]) -> Vec<Vitamin> {
    list.iter()
        .map(|(name, amount, percent)| Vitamin {
            name: name.to_string(),
            amount: amount.to_string(),
            percent: *percent,
        })
        .collect()
}

fn food(
    id: &str,
    name: &str,
    image: &str,
    [calories, protein, carbs, fat, fiber]: [f64; 5],
    sizes: &[(&str, f64)],
    vits: &[(&str, &str, u32)],
) -> FoodItem {
    FoodItem {
        id: id.to_string(),
        name: name.to_string(),
        image: image.to_string(),
        calories,
        protein,
        carbs,
        fat,
        fiber,
        serving_sizes: servings(sizes),
        vitamins: vitamins(vits),
    }
}

fn build_foods() -> Vec<FoodItem> {
    vec![
        food(
            "banana",
            "Banana (Medium)",
            "https://images.unsplash.com/photo-1571771894821-ce9b6c11b08e?w=400&h=400&fit=crop",
            [105.0, 1.3, 27.0, 0.4, 3.1],
            &[("1 medium (118g)", 118.0), ("100g", 100.0), ("1 large (136g)", 136.0)],
            &[("Vitamin B6", "0.4mg", 25), ("Vitamin C", "10mg", 11), ("Potassium", "422mg", 9)],
        ),
        food(
            "avocado-toast",
            "Avocado Toast",
            "https://images.unsplash.com/photo-1541519227354-08fa5d50c44d?w=400&h=400&fit=crop",
            [250.0, 6.0, 24.0, 15.0, 7.0],
            &[("1 slice (110g)", 110.0), ("2 slices (220g)", 220.0)],
            &[("Folate", "60mcg", 15), ("Vitamin K", "14mcg", 12)],
        ),
        food(
            "greek-yogurt",
            "Greek Yogurt",
            "https://images.unsplash.com/photo-1488477181946-6428a0291777?w=400&h=400&fit=crop",
            [120.0, 20.0, 7.0, 0.7, 0.0],
            &[("1 cup (200g)", 200.0), ("100g", 100.0)],
            &[("Calcium", "220mg", 17), ("Vitamin B12", "1.3mcg", 54)],
        ),
        food(
            "oatmeal",
            "Oatmeal",
            "https://images.unsplash.com/photo-1517673400267-0251440c45dc?w=400&h=400&fit=crop",
            [150.0, 5.0, 27.0, 3.0, 4.0],
            &[("1 cup cooked (234g)", 234.0), ("100g", 100.0)],
            &[("Iron", "1.7mg", 9), ("Magnesium", "56mg", 13)],
        ),
        food(
            "boiled-egg",
            "Boiled Egg",
            "https://images.unsplash.com/photo-1482049016688-2d3e1b311543?w=400&h=400&fit=crop",
            [78.0, 6.3, 0.6, 5.3, 0.0],
            &[("1 large (50g)", 50.0), ("2 large (100g)", 100.0)],
            &[("Vitamin D", "1mcg", 5), ("Vitamin B12", "0.6mcg", 25)],
        ),
        food(
            "chicken-breast",
            "Grilled Chicken Breast",
            "https://images.unsplash.com/photo-1532550907401-a500c9a57435?w=400&h=400&fit=crop",
            [165.0, 31.0, 0.0, 3.6, 0.0],
            &[("100g", 100.0), ("1 breast (172g)", 172.0)],
            &[("Niacin", "13mg", 81), ("Vitamin B6", "0.6mg", 35)],
        ),
        food(
            "brown-rice",
            "Brown Rice",
            "https://images.unsplash.com/photo-1536304993881-ff6e9eefa2a6?w=400&h=400&fit=crop",
            [216.0, 5.0, 45.0, 1.8, 3.5],
            &[("1 cup cooked (195g)", 195.0), ("100g", 100.0)],
            &[("Manganese", "1.8mg", 78), ("Magnesium", "84mg", 20)],
        ),
        food(
            "masala-dosa",
            "Masala Dosa",
            "https://images.unsplash.com/photo-1668236543090-82eba5ee5976?w=400&h=400&fit=crop",
            [387.0, 7.0, 52.0, 16.0, 4.0],
            &[("1 dosa (175g)", 175.0), ("100g", 100.0)],
            &[("Vitamin C", "12mg", 13)],
        ),
        food(
            "idli",
            "Idli",
            "https://images.unsplash.com/photo-1589301760014-d929f3979dbc?w=400&h=400&fit=crop",
            [58.0, 2.0, 12.0, 0.4, 0.6],
            &[("1 idli (40g)", 40.0), ("3 idlis (120g)", 120.0)],
            &[],
        ),
        food(
            "paneer-tikka",
            "Paneer Tikka",
            "https://images.unsplash.com/photo-1567188040759-fb8a883dc6d8?w=400&h=400&fit=crop",
            [265.0, 18.0, 6.0, 19.0, 1.0],
            &[("1 plate (150g)", 150.0), ("100g", 100.0)],
            &[("Calcium", "480mg", 37)],
        ),
        food(
            "apple",
            "Apple",
            "https://images.unsplash.com/photo-1560806887-1e4cd0b6cbd6?w=400&h=400&fit=crop",
            [95.0, 0.5, 25.0, 0.3, 4.4],
            &[("1 medium (182g)", 182.0), ("100g", 100.0)],
            &[("Vitamin C", "8mg", 9)],
        ),
        food(
            "salmon",
            "Baked Salmon",
            "https://images.unsplash.com/photo-1467003909585-2f8a72700288?w=400&h=400&fit=crop",
            [206.0, 22.0, 0.0, 12.0, 0.0],
            &[("100g", 100.0), ("1 fillet (154g)", 154.0)],
            &[("Vitamin D", "11mcg", 55), ("Omega-3", "1.8g", 100)],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn recipe(
    id: &str,
    name: &str,
    description: &str,
    image: &str,
    [calories, protein, carbs, fat]: [f64; 4],
    (prep_time, cook_time, servings): (&str, &str, u32),
    category: RecipeCategory,
    tags: &[&str],
    ingredients: &[&str],
    instructions: &[&str],
) -> Recipe {
    let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        image: image.to_string(),
        calories,
        protein,
        carbs,
        fat,
        prep_time: prep_time.to_string(),
        cook_time: cook_time.to_string(),
        servings,
        category,
        tags: owned(tags),
        ingredients: owned(ingredients),
        instructions: owned(instructions),
    }
}

fn build_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            "grilled-chicken-quinoa",
            "Grilled Chicken Quinoa Bowl",
            "Lean chicken over quinoa with roasted vegetables.",
            "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=400&fit=crop",
            [520.0, 45.0, 48.0, 14.0],
            ("15 min", "20 min", 2),
            RecipeCategory::HighProtein,
            &["meal prep", "gluten free"],
            &["2 chicken breasts", "1 cup quinoa", "1 zucchini", "1 bell pepper", "1 tbsp olive oil"],
            &["Cook the quinoa.", "Grill the chicken 6 minutes per side.", "Roast the vegetables.", "Assemble the bowls."],
        ),
        recipe(
            "paneer-bhurji",
            "Paneer Bhurji",
            "Scrambled cottage cheese with onions, tomatoes and spices.",
            "https://images.unsplash.com/photo-1631452180519-c014fe946bc7?w=400&h=400&fit=crop",
            [380.0, 24.0, 10.0, 27.0],
            ("10 min", "15 min", 2),
            RecipeCategory::HighProtein,
            &["vegetarian", "indian"],
            &["200g paneer", "1 onion", "2 tomatoes", "1 tsp turmeric", "1 green chilli"],
            &["Saute the onion and chilli.", "Add tomatoes and spices.", "Crumble in the paneer and cook 5 minutes."],
        ),
        recipe(
            "veggie-pasta",
            "Whole Wheat Veggie Pasta",
            "Pasta tossed with seasonal vegetables and a light tomato sauce.",
            "https://images.unsplash.com/photo-1551892374-ecf8754cf8b0?w=400&h=400&fit=crop",
            [480.0, 16.0, 82.0, 10.0],
            ("10 min", "20 min", 2),
            RecipeCategory::HighCarb,
            &["vegetarian", "pre-workout"],
            &["200g whole wheat pasta", "1 cup tomato sauce", "1 cup spinach", "1 zucchini"],
            &["Boil the pasta.", "Simmer the sauce with vegetables.", "Toss together and serve."],
        ),
        recipe(
            "poha",
            "Vegetable Poha",
            "Flattened rice with peas, peanuts and curry leaves.",
            "https://images.unsplash.com/photo-1645177628172-a94c1f96e6db?w=400&h=400&fit=crop",
            [310.0, 7.0, 54.0, 8.0],
            ("10 min", "10 min", 2),
            RecipeCategory::HighCarb,
            &["breakfast", "indian", "vegan"],
            &["2 cups poha", "1/2 cup peas", "2 tbsp peanuts", "curry leaves", "1 lemon"],
            &["Rinse the poha.", "Temper mustard seeds and curry leaves.", "Add peas, peanuts and poha; finish with lemon."],
        ),
        recipe(
            "zucchini-noodles",
            "Zucchini Noodles with Pesto",
            "Spiralized zucchini tossed in basil pesto with cherry tomatoes.",
            "https://images.unsplash.com/photo-1512058564366-18510be2db19?w=400&h=400&fit=crop",
            [290.0, 9.0, 12.0, 24.0],
            ("15 min", "5 min", 2),
            RecipeCategory::LowCarb,
            &["keto", "vegetarian"],
            &["3 zucchini", "3 tbsp pesto", "1 cup cherry tomatoes", "2 tbsp parmesan"],
            &["Spiralize the zucchini.", "Warm briefly in a pan.", "Toss with pesto and tomatoes."],
        ),
        recipe(
            "salmon-asparagus",
            "Lemon Salmon with Asparagus",
            "Oven-baked salmon fillet with asparagus and lemon.",
            "https://images.unsplash.com/photo-1467003909585-2f8a72700288?w=400&h=400&fit=crop",
            [420.0, 38.0, 8.0, 26.0],
            ("10 min", "15 min", 2),
            RecipeCategory::LowCarb,
            &["keto", "omega-3"],
            &["2 salmon fillets", "1 bunch asparagus", "1 lemon", "1 tbsp olive oil"],
            &["Heat the oven to 200C.", "Arrange salmon and asparagus on a tray.", "Bake 12-15 minutes."],
        ),
        recipe(
            "dal-rice",
            "Dal with Brown Rice",
            "Comforting lentil curry served over brown rice.",
            "https://images.unsplash.com/photo-1546833999-b9f581a1996d?w=400&h=400&fit=crop",
            [450.0, 18.0, 70.0, 9.0],
            ("10 min", "30 min", 3),
            RecipeCategory::Balanced,
            &["indian", "vegan", "comfort food"],
            &["1 cup toor dal", "1 cup brown rice", "1 onion", "2 tomatoes", "1 tsp cumin"],
            &["Pressure cook the dal.", "Cook the rice.", "Temper spices and mix into the dal."],
        ),
        recipe(
            "turkey-wrap",
            "Turkey Avocado Wrap",
            "Whole grain wrap with turkey, avocado and greens.",
            "https://images.unsplash.com/photo-1626700051175-6818013e1d4f?w=400&h=400&fit=crop",
            [410.0, 28.0, 36.0, 16.0],
            ("10 min", "0 min", 1),
            RecipeCategory::Balanced,
            &["lunch", "quick"],
            &["1 whole grain tortilla", "80g turkey slices", "1/2 avocado", "handful of greens"],
            &["Spread the avocado on the tortilla.", "Layer turkey and greens.", "Roll tightly and slice."],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search_foods("").is_empty());
        assert!(search_foods("   ").is_empty());
        assert!(search_recipes("").is_empty());
    }

    #[test]
    fn food_search_is_case_insensitive_substring() {
        let names: Vec<_> = search_foods("EGG").iter().map(|f| f.id.as_str()).collect();
        assert_eq!(names, vec!["boiled-egg"]);
        assert!(search_foods("zzz").is_empty());
    }

    #[test]
    fn prefix_matches_rank_first() {
        let ids: Vec<_> = search_foods("b").iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["banana", "boiled-egg", "brown-rice", "salmon", "chicken-breast"]
        );
    }

    #[test]
    fn recipe_search_falls_back_to_tags() {
        let ids: Vec<_> = search_recipes("keto").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zucchini-noodles", "salmon-asparagus"]);

        let ids: Vec<_> = search_recipes("paneer").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["paneer-bhurji"]);
    }

    #[test]
    fn lookups_by_id_and_category() {
        assert_eq!(food_by_id("banana").unwrap().calories, 105.0);
        assert!(food_by_id("missing").is_none());
        assert_eq!(recipe_by_id("dal-rice").unwrap().servings, 3);

        for category in [
            RecipeCategory::HighProtein,
            RecipeCategory::Balanced,
            RecipeCategory::HighCarb,
            RecipeCategory::LowCarb,
        ] {
            let found = recipes_by_category(category);
            assert_eq!(found.len(), 2);
            assert!(found.iter().all(|r| r.category == category));
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = foods().iter().map(|f| f.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), foods().len());
        assert!(foods().iter().all(|f| !f.serving_sizes.is_empty()));
        assert_eq!(recipes().len(), 8);
    }
}
