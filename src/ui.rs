use crate::models::Field;
use crate::view::{Row, RowMode, TableView};

pub fn render_index(view: &TableView) -> String {
    let form = view.form();
    INDEX_HTML
        .replace("{{COUNT}}", &view.count_label())
        .replace("{{FILTER}}", &escape_html(view.filter()))
        .replace("{{TODAY}}", &escape_html(&form.date))
        .replace("{{NO_RESULTS}}", if view.shows_no_results() { "" } else { " hidden" })
        .replace("{{ROWS}}", &render_table_body(view))
}

/// Markup for `<tbody>`: either the placeholder row or one row per entry,
/// with rows the filter rejects marked hidden.
pub fn render_table_body(view: &TableView) -> String {
    if view.is_empty_state() {
        return EMPTY_STATE_ROW.to_string();
    }
    view.rows().iter().map(render_row).collect()
}

fn render_row(row: &Row) -> String {
    let disabled = if row.mode() == RowMode::Disabled { " disabled" } else { "" };
    let hidden = if row.is_visible() { "" } else { " hidden" };
    let mut html = format!(r#"<tr data-id="{}"{hidden}>"#, row.id());
    for field in Field::ALL {
        html.push_str(&format!(
            r#"<td><input type="{}" class="table-input" data-field="{}" aria-label="{}" value="{}"{disabled}></td>"#,
            field.input_type(),
            field.json_name(),
            field.label(),
            escape_html(row.draft().get(field)),
        ));
    }
    let (edit_label, edit_class) = match row.mode() {
        RowMode::Disabled => ("Edit", "edit-btn"),
        RowMode::Editable => ("Save", "edit-btn save"),
    };
    html.push_str(&format!(
        r#"<td class="actions"><button type="button" class="{edit_class}" data-action="edit">{edit_label}</button><button type="button" class="delete-btn" data-action="delete">Delete</button></td></tr>"#
    ));
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const EMPTY_STATE_ROW: &str = r#"<tr class="empty-state"><td colspan="7"><h3>No entries yet</h3><p>Add your first entry above to get started</p></td></tr>"#;

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Visitor Log</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #26323b;
      --muted: #6b7780;
      --accent: #2f6f8f;
      --danger: #b9473a;
      --ok: #3c8a5a;
      --card: #ffffff;
      --line: #e2ddd2;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1120px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 14px;
      padding: 20px 22px;
    }

    h1 {
      margin: 0 0 4px;
      font-size: 1.8rem;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    form.entry-form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input {
      font: inherit;
      padding: 8px 10px;
      border: 1px solid var(--line);
      border-radius: 8px;
      background: #fff;
      color: var(--ink);
    }

    input:disabled {
      background: transparent;
      border-color: transparent;
      color: var(--ink);
    }

    button {
      font: inherit;
      border: none;
      border-radius: 8px;
      padding: 8px 14px;
      cursor: pointer;
      color: #fff;
      background: var(--accent);
    }

    .edit-btn.save {
      background: var(--ok);
    }

    .delete-btn {
      background: var(--danger);
      margin-left: 6px;
    }

    .table-head {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      margin-bottom: 12px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 6px 4px;
      border-bottom: 1px solid var(--line);
    }

    .table-input {
      width: 100%;
    }

    .actions {
      white-space: nowrap;
    }

    .empty-state td {
      text-align: center;
      padding: 32px 0;
      color: var(--muted);
    }

    #noResults {
      padding: 16px 0;
      text-align: center;
      color: var(--muted);
    }

    .alert {
      padding: 10px 14px;
      border-radius: 8px;
      color: #fff;
    }

    .alert.success {
      background: var(--ok);
    }

    .alert.error {
      background: var(--danger);
    }

    .fade-out {
      animation: fadeOut 0.3s forwards;
    }

    @keyframes fadeOut {
      to {
        opacity: 0;
        transform: translateX(12px);
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Visitor Log</h1>
      <p class="subtitle">Scheduled visits and room bookings.</p>
    </header>

    <div id="alertContainer" aria-live="polite"></div>

    <section class="card">
      <form id="entryForm" class="entry-form" autocomplete="off">
        <label>Reg. number<input id="regNumber" type="text" /></label>
        <label>Name<input id="name" type="text" /></label>
        <label>Company<input id="companyName" type="text" /></label>
        <label>Time<input id="duration" type="time" /></label>
        <label>Date<input id="date" type="date" value="{{TODAY}}" /></label>
        <label>Room<input id="roomNumber" type="text" /></label>
        <button type="submit">Add entry</button>
      </form>
    </section>

    <section class="card">
      <div class="table-head">
        <strong id="entryCount">{{COUNT}}</strong>
        <input id="searchInput" type="search" placeholder="Search entries" value="{{FILTER}}" />
      </div>
      <table>
        <thead>
          <tr>
            <th>Reg. number</th>
            <th>Name</th>
            <th>Company</th>
            <th>Time</th>
            <th>Date</th>
            <th>Room</th>
            <th></th>
          </tr>
        </thead>
        <tbody id="tableBody">{{ROWS}}</tbody>
      </table>
      <div id="noResults"{{NO_RESULTS}}>No matching entries.</div>
    </section>
  </main>

  <script>
    const FIELDS = ['regNumber', 'name', 'companyName', 'duration', 'date', 'roomNumber'];
    const INPUT_TYPES = { duration: 'time', date: 'date' };
    const NOTICE_MS = 5000;
    const FADE_MS = 300;

    const tbody = document.getElementById('tableBody');
    const countEl = document.getElementById('entryCount');
    const noResultsEl = document.getElementById('noResults');
    const searchInput = document.getElementById('searchInput');
    const alertContainer = document.getElementById('alertContainer');
    const entryForm = document.getElementById('entryForm');

    // Source of truth for the table; the DOM is rebuilt from it.
    let rows = [];
    let noticeTimer = null;

    const showAlert = (message, type) => {
      alertContainer.replaceChildren();
      const alert = document.createElement('div');
      alert.className = `alert ${type}`;
      alert.textContent = message;
      alertContainer.appendChild(alert);
      clearTimeout(noticeTimer);
      noticeTimer = setTimeout(() => alert.remove(), NOTICE_MS);
    };

    const pick = (source) => Object.fromEntries(FIELDS.map((field) => [field, String(source[field] ?? '')]));
    const trimmed = (fields) => Object.fromEntries(FIELDS.map((field) => [field, fields[field].trim()]));
    const isComplete = (fields) => FIELDS.every((field) => fields[field] !== '');
    const sortKey = (fields) => `${fields.date}T${fields.duration}`;

    const sortRows = () => {
      rows.sort((a, b) => {
        const left = sortKey(a.entry);
        const right = sortKey(b.entry);
        return left < right ? -1 : left > right ? 1 : 0;
      });
    };

    const matches = (row, needle) =>
      FIELDS.some((field) => row.draft[field].toUpperCase().includes(needle));

    const emptyStateRow = () => {
      const tr = document.createElement('tr');
      tr.className = 'empty-state';
      const td = document.createElement('td');
      td.colSpan = 7;
      const title = document.createElement('h3');
      title.textContent = 'No entries yet';
      const hint = document.createElement('p');
      hint.textContent = 'Add your first entry above to get started';
      td.append(title, hint);
      tr.appendChild(td);
      return tr;
    };

    const buildRow = (row) => {
      const id = row.entry.id;
      const tr = document.createElement('tr');
      tr.dataset.id = id;
      FIELDS.forEach((field) => {
        const td = document.createElement('td');
        const input = document.createElement('input');
        input.type = INPUT_TYPES[field] || 'text';
        input.className = 'table-input';
        input.dataset.field = field;
        input.value = row.draft[field];
        input.disabled = !row.editing;
        input.addEventListener('input', () => {
          row.draft[field] = input.value;
        });
        td.appendChild(input);
        tr.appendChild(td);
      });

      const actions = document.createElement('td');
      actions.className = 'actions';
      const editBtn = document.createElement('button');
      editBtn.type = 'button';
      editBtn.className = row.editing ? 'edit-btn save' : 'edit-btn';
      editBtn.textContent = row.editing ? 'Save' : 'Edit';
      editBtn.addEventListener('click', () => toggleEdit(id));
      const deleteBtn = document.createElement('button');
      deleteBtn.type = 'button';
      deleteBtn.className = 'delete-btn';
      deleteBtn.textContent = 'Delete';
      deleteBtn.addEventListener('click', () => deleteEntry(id, tr));
      actions.append(editBtn, deleteBtn);
      tr.appendChild(actions);
      return tr;
    };

    const render = () => {
      const needle = searchInput.value.toUpperCase();
      let visible = 0;
      tbody.replaceChildren();
      if (rows.length === 0) {
        tbody.appendChild(emptyStateRow());
      }
      rows.forEach((row) => {
        const tr = buildRow(row);
        if (matches(row, needle)) {
          visible += 1;
        } else {
          tr.hidden = true;
        }
        tbody.appendChild(tr);
      });
      countEl.textContent = `${rows.length} ${rows.length === 1 ? 'entry' : 'entries'}`;
      noResultsEl.hidden = !(rows.length > 0 && visible === 0);
    };

    const request = async (method, path, body) => {
      const options = { method };
      if (body) {
        options.headers = { 'content-type': 'application/json' };
        options.body = JSON.stringify(body);
      }
      const res = await fetch(path, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || `Request failed (${res.status})`);
      }
      return res.json();
    };

    const toRow = (entry) => ({ entry, draft: pick(entry), editing: false });

    const load = async () => {
      const entries = await request('GET', '/entries');
      rows = entries.map(toRow);
      sortRows();
      render();
    };

    const addEntry = async () => {
      const fields = trimmed(pick(Object.fromEntries(
        FIELDS.map((field) => [field, document.getElementById(field).value])
      )));
      if (!isComplete(fields)) {
        showAlert('Please fill in all fields.', 'error');
        return;
      }
      try {
        const data = await request('POST', '/add-entry', fields);
        if (!data.id) {
          throw new Error('Failed to get new entry ID from server.');
        }
        rows.push(toRow({ id: data.id, ...fields }));
        sortRows();
        render();
        FIELDS.filter((field) => field !== 'date').forEach((field) => {
          document.getElementById(field).value = '';
        });
        showAlert('Entry added successfully!', 'success');
      } catch (err) {
        console.error('Error saving entry:', err);
        showAlert('Failed to save entry.', 'error');
      }
    };

    const toggleEdit = async (id) => {
      const row = rows.find((candidate) => candidate.entry.id === id);
      if (!row) {
        return;
      }
      if (!row.editing) {
        row.editing = true;
        render();
        const first = tbody.querySelector(`tr[data-id="${id}"] input`);
        if (first) {
          first.focus();
        }
        return;
      }

      const fields = trimmed(row.draft);
      if (!isComplete(fields)) {
        showAlert('All fields are required when saving.', 'error');
        return;
      }
      try {
        await request('PUT', `/update-entry/${id}`, fields);
        row.entry = { id, ...fields };
        row.draft = { ...fields };
        row.editing = false;
        sortRows();
        render();
        showAlert('Entry updated successfully!', 'success');
      } catch (err) {
        console.error('Error updating entry:', err);
        showAlert('Failed to update entry.', 'error');
      }
    };

    const deleteEntry = async (id, tr) => {
      if (!confirm('Are you sure you want to delete this entry?')) {
        return;
      }
      try {
        await request('DELETE', `/delete-entry/${id}`);
        tr.classList.add('fade-out');
        setTimeout(() => {
          rows = rows.filter((row) => row.entry.id !== id);
          render();
          showAlert('Entry deleted successfully!', 'success');
        }, FADE_MS);
      } catch (err) {
        console.error('Error deleting entry:', err);
        showAlert('Failed to delete entry from the database.', 'error');
      }
    };

    entryForm.addEventListener('submit', (event) => {
      event.preventDefault();
      addEntry();
    });

    searchInput.addEventListener('input', render);

    const dateInput = document.getElementById('date');
    if (!dateInput.value) {
      dateInput.value = new Date().toISOString().split('T')[0];
    }

    load().catch((err) => {
      console.error('Error loading entries:', err);
      showAlert('Failed to load entries.', 'error');
    });
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, EntryFields};
    use chrono::NaiveDate;

    fn view_with(entries: Vec<Entry>) -> TableView {
        TableView::with_entries(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(), entries)
    }

    fn entry(id: i64, company: &str) -> Entry {
        Entry {
            id,
            fields: EntryFields {
                reg_number: format!("R-{id}"),
                name: "Visitor".into(),
                company_name: company.into(),
                duration: "09:00".into(),
                date: "2024-05-06".into(),
                room_number: "2".into(),
            },
        }
    }

    #[test]
    fn empty_view_renders_placeholder() {
        let html = render_index(&view_with(Vec::new()));
        assert!(html.contains(r#"class="empty-state""#));
        assert!(html.contains("0 entries"));
        assert!(html.contains(r#"value="2024-05-06""#));
        assert!(html.contains(r#"<div id="noResults" hidden>"#));
    }

    #[test]
    fn rows_render_disabled_with_escaped_values() {
        let html = render_table_body(&view_with(vec![entry(3, r#"<b>"Acme" & Co</b>"#)]));
        assert!(html.contains(r#"<tr data-id="3">"#));
        assert!(html.contains("&lt;b&gt;&quot;Acme&quot; &amp; Co&lt;/b&gt;"));
        assert!(html.contains(" disabled>"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("empty-state"));
    }

    #[test]
    fn filtered_out_rows_are_hidden_and_no_results_shows() {
        let mut view = view_with(vec![entry(1, "Acme"), entry(2, "Globex")]);
        view.set_filter("zzz");
        let html = render_index(&view);
        assert!(html.contains(r#"<tr data-id="1" hidden>"#));
        assert!(html.contains(r#"<tr data-id="2" hidden>"#));
        assert!(html.contains(r#"<div id="noResults">"#));
        assert!(html.contains(r#"value="zzz""#));
        assert!(html.contains("2 entries"));
    }

    #[test]
    fn editable_row_renders_save_button() {
        let mut view = view_with(vec![entry(1, "Acme")]);
        view.toggle_edit(1, chrono::Utc::now()).unwrap();
        let html = render_table_body(&view);
        assert!(html.contains(">Save</button>"));
        assert!(!html.contains(" disabled>"));
    }
}
