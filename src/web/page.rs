use crate::views::ViewIndicator;
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Everything the page shell needs for one freshly created session.
pub struct PageContext<'a> {
    pub session_id: &'a str,
    pub title: &'a str,
    pub interval_ms: u64,
    pub rotation_enabled: bool,
    pub glyph: &'a str,
    pub indicator: &'a ViewIndicator,
    pub content: Markup,
}

pub fn page(ctx: PageContext<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (ctx.title) }
                link rel="stylesheet" href="/assets/css/board.css";
            }
            body
                data-session=(ctx.session_id)
                data-interval-ms=(ctx.interval_ms)
                data-enabled=(ctx.rotation_enabled) {
                div.app-header {
                    div.header-content {
                        h1.app-title { "Tournament Visualization" }
                        div.rotation-controls {
                            span.rotation-status { "Auto-rotating views" }
                            button #rotation-toggle.rotation-button type="button" { (ctx.glyph) }
                        }
                    }
                }
                (indicator(ctx.indicator))
                div #view-content.main-content {
                    (ctx.content)
                }
                script { (PreEscaped(ROTATION_SCRIPT)) }
            }
        }
    }
}

pub fn indicator(indicator: &ViewIndicator) -> Markup {
    html! {
        div #view-indicator.view-indicator {
            div #current-view-name.current-view { (indicator.display_name) }
            div #progress-dots.progress-dots {
                @for active in &indicator.dots {
                    div.progress-dot.active[*active] {}
                }
            }
        }
    }
}

/// Drives the session from the browser: one tick per interval with a
/// counter starting at 0, the toggle button, and content swaps.
const ROTATION_SCRIPT: &str = r#"
(function () {
  const body = document.body;
  const session = body.dataset.session;
  const intervalMs = Number(body.dataset.intervalMs);
  const toggle = document.getElementById("rotation-toggle");
  let enabled = body.dataset.enabled === "true";
  let ticks = 0;
  let timer = null;

  function renderIndicator(indicator) {
    document.getElementById("current-view-name").textContent = indicator.display_name;
    const dots = document.getElementById("progress-dots");
    dots.replaceChildren(...indicator.dots.map(function (active) {
      const dot = document.createElement("div");
      dot.className = active ? "progress-dot active" : "progress-dot";
      return dot;
    }));
  }

  async function tick() {
    const n = ticks++;
    const resp = await fetch("/api/sessions/" + session + "/tick", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ n_intervals: n }),
    });
    if (!resp.ok) return;
    const update = await resp.json();
    if (!update.changed) return;
    document.getElementById("view-content").innerHTML = update.html;
    renderIndicator(update.indicator);
  }

  function start() {
    if (timer === null) timer = setInterval(tick, intervalMs);
  }

  function stop() {
    if (timer !== null) clearInterval(timer);
    timer = null;
  }

  toggle.addEventListener("click", async function () {
    const resp = await fetch("/api/sessions/" + session + "/toggle", { method: "POST" });
    if (!resp.ok) return;
    const state = await resp.json();
    enabled = state.enabled;
    toggle.textContent = state.glyph;
    if (state.enabled) start(); else stop();
  });

  // the first tick is always applied, even when starting paused
  if (enabled) {
    start();
  } else {
    setTimeout(tick, intervalMs);
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewRegistry;

    #[test]
    fn page_carries_session_and_interval() {
        let indicator = ViewRegistry::default().indicator("tree");
        let markup = page(PageContext {
            session_id: "abc123",
            title: "next generation trophy 25/26",
            interval_ms: 30_000,
            rotation_enabled: true,
            glyph: "⏸️",
            indicator: &indicator,
            content: html! { p { "content" } },
        })
        .into_string();

        assert!(markup.starts_with("<!DOCTYPE html>"));
        assert!(markup.contains(r#"data-session="abc123""#));
        assert!(markup.contains(r#"data-interval-ms="30000""#));
        assert!(markup.contains(r#"data-enabled="true""#));
        assert!(markup.contains("<p>content</p>"));
    }

    #[test]
    fn page_exposes_ids_the_script_looks_up() {
        let indicator = ViewRegistry::default().indicator("tree");
        let markup = page(PageContext {
            session_id: "abc123",
            title: "board",
            interval_ms: 30_000,
            rotation_enabled: false,
            glyph: "▶️",
            indicator: &indicator,
            content: html! {},
        })
        .into_string();

        for id in ["rotation-toggle", "view-content", "view-indicator", "current-view-name", "progress-dots"] {
            assert!(markup.contains(&format!(r#"id="{id}""#)), "missing #{id}");
        }
        assert!(markup.contains(r#"class="rotation-button""#));
        assert!(markup.contains(r#"class="main-content""#));
    }

    #[test]
    fn indicator_marks_one_active_dot() {
        let indicator = ViewRegistry::default().indicator("schedule");
        let markup = super::indicator(&indicator).into_string();
        assert_eq!(markup.matches("progress-dot active").count(), 1);
        assert_eq!(markup.matches(r#""progress-dot""#).count(), 2);
        assert!(markup.contains("Tournament Schedule"));
    }
}
