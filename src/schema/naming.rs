const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("data", "datum"),
    ("media", "media"),
    ("news", "news"),
    ("series", "series"),
    ("statuses", "status"),
    ("addresses", "address"),
];

/// English singular of a lowercase table-name segment.
pub fn singularize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }

    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

/// `order_items` -> `OrderItems`
pub fn studly(word: &str) -> String {
    word.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `OrderItem` -> `order_item`, `userProfile` -> `user_profile`
pub fn snake(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, c) in word.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Conventional model class for a table: only the last segment is singularized.
pub fn model_for_table(table: &str) -> String {
    let mut segments: Vec<&str> = table.split('_').collect();
    let last = segments.pop().unwrap_or_default();
    let singular = singularize(last);
    segments.push(&singular);
    studly(&segments.join("_"))
}

/// `App\Models\User` -> `User`
pub fn class_basename(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("classes"), "class");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("address"), "address");
    }

    #[test]
    fn test_model_for_table() {
        assert_eq!(model_for_table("users"), "User");
        assert_eq!(model_for_table("order_items"), "OrderItem");
        assert_eq!(model_for_table("blog_categories"), "BlogCategory");
        assert_eq!(model_for_table("people"), "Person");
    }

    #[test]
    fn test_snake() {
        assert_eq!(snake("OrderItem"), "order_item");
        assert_eq!(snake("userProfile"), "user_profile");
        assert_eq!(snake("User"), "user");
    }

    #[test]
    fn test_class_basename() {
        assert_eq!(class_basename("App\\Models\\User"), "User");
        assert_eq!(class_basename("Team"), "Team");
    }
}
