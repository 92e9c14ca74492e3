//! HTML views
//!
//! Server-rendered pages for the place list (`/`) and the edit form
//! (`/edit/:place_id`).

use crate::constants::api::GOOGLE_STATIC_MAP_URL;
use crate::places::Place;

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} - placebook</title>
  <link rel="stylesheet" href="/static/app.css">
</head>
<body>
  <header><a href="/">placebook</a></header>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

/// The list view with the add form
pub fn home(places: &[Place]) -> String {
    let mut body = String::new();

    body.push_str(
        r#"    <form class="add" method="post" action="/places">
      <input name="lat" placeholder="Latitude" inputmode="decimal">
      <input name="lng" placeholder="Longitude" inputmode="decimal">
      <label><input type="checkbox" name="here"> Use my location</label>
      <button type="submit">Save place</button>
    </form>
"#,
    );

    if places.is_empty() {
        body.push_str("    <p class=\"empty\">No places saved yet.</p>\n");
        return layout("Places", &body);
    }

    body.push_str("    <ul class=\"places\">\n");
    for place in places {
        body.push_str(&format!(
            "      <li><span class=\"flag\">{flag}</span> <a href=\"/edit/{id}\">{address}</a> \
             <span class=\"country\">{country}</span> <span class=\"coords\">{coords}</span> \
             <time>{date}</time></li>\n",
            flag = escape(place.flag_emoji.as_deref().unwrap_or("")),
            id = escape(&place.id),
            address = escape(place.display_address()),
            country = escape(place.country.as_deref().unwrap_or("")),
            coords = escape(&place.coords.to_string()),
            date = place.created_at,
        ));
    }
    body.push_str("    </ul>\n");

    layout("Places", &body)
}

/// The edit form for one place
pub fn edit(place: &Place, map_api_key: Option<&str>) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "    <h1>{flag} {address}</h1>\n    <p class=\"meta\">Saved {date} · {id}</p>\n",
        flag = escape(place.flag_emoji.as_deref().unwrap_or("")),
        address = escape(place.display_address()),
        date = place.created_at,
        id = escape(&place.id),
    ));

    if let Some(key) = map_api_key {
        body.push_str(&format!(
            "    <img class=\"map\" alt=\"Map\" src=\"{}\">\n",
            escape(&static_map_url(place, key))
        ));
    }

    body.push_str(&format!(
        r#"    <form class="edit" method="post" action="/edit/{id}">
      <label>Address <input name="address" value="{address}"></label>
      <label>Country <input name="country" value="{country}"></label>
      <label>Flag <input name="flag_emoji" value="{flag}"></label>
      <label>Latitude <input name="lat" value="{lat}" inputmode="decimal"></label>
      <label>Longitude <input name="lng" value="{lng}" inputmode="decimal"></label>
      <button type="submit">Save</button>
    </form>
    <form class="delete" method="post" action="/edit/{id}/delete">
      <button type="submit">Delete</button>
    </form>
"#,
        id = escape(&place.id),
        address = escape(place.address.as_deref().unwrap_or("")),
        country = escape(place.country.as_deref().unwrap_or("")),
        flag = escape(place.flag_emoji.as_deref().unwrap_or("")),
        lat = place.coords.lat,
        lng = place.coords.lng,
    ));

    layout("Edit place", &body)
}

/// A page with a single message
pub fn message(title: &str, text: &str) -> String {
    let body = format!(
        "    <h1>{}</h1>\n    <p>{}</p>\n    <p><a href=\"/\">Back to places</a></p>\n",
        escape(title),
        escape(text)
    );
    layout(title, &body)
}

fn static_map_url(place: &Place, key: &str) -> String {
    let center = urlencoding::encode(&place.coords.latlng()).into_owned();
    format!(
        "{}?center={center}&zoom=14&size=480x240&markers={center}&key={}",
        GOOGLE_STATIC_MAP_URL,
        urlencoding::encode(key),
        center = center
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::places::PlaceDraft;

    fn sample_place() -> Place {
        Place::new(PlaceDraft {
            address: Some("<b>Main</b> & Co".to_string()),
            country: Some("Canada".to_string()),
            flag_emoji: Some("🇨🇦".to_string()),
            coords: Some(Coordinates::new(45.5, -73.56)),
        })
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_home_empty() {
        let html = home(&[]);
        assert!(html.contains("No places saved yet."));
        assert!(html.contains("action=\"/places\""));
    }

    #[test]
    fn test_home_lists_places() {
        let place = sample_place();
        let html = home(std::slice::from_ref(&place));

        assert!(html.contains(&format!("/edit/{}", place.id)));
        assert!(html.contains("&lt;b&gt;Main&lt;/b&gt; &amp; Co"));
        assert!(html.contains("🇨🇦"));
        assert!(!html.contains("<b>Main</b>"));
    }

    #[test]
    fn test_home_one_line_per_place() {
        let places = vec![sample_place(), sample_place()];
        let html = home(&places);

        let items: Vec<&str> = html.lines().filter(|l| l.trim_start().starts_with("<li>")).collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|l| l.ends_with("</li>")));
    }

    #[test]
    fn test_edit_form() {
        let place = sample_place();
        let html = edit(&place, None);

        assert!(html.contains(&format!("action=\"/edit/{}\"", place.id)));
        assert!(html.contains("value=\"45.5\""));
        assert!(html.contains("value=\"-73.56\""));
        assert!(!html.contains("class=\"map\""));
    }

    #[test]
    fn test_edit_with_map() {
        let html = edit(&sample_place(), Some("map-key"));
        assert!(html.contains("class=\"map\""));
        assert!(html.contains("key=map-key"));
        assert!(html.contains("center=45.5%2C-73.56"));
    }
}
