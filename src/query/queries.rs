/// Item lookup
pub const GET_ITEM: &str = "SELECT id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at FROM auction_items WHERE id = $1";

/// Item existence check, for typed not-found errors ahead of an insert
pub const ITEM_EXISTS: &str = "SELECT id FROM auction_items WHERE id = $1";

/// Item lookup with a row lock, scoped to the enclosing transaction. Serializes
/// concurrent bids on one item and keeps the closer from racing a bid.
pub const GET_ITEM_FOR_UPDATE: &str = "SELECT id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at FROM auction_items WHERE id = $1 FOR UPDATE";

/// All listings, newest first
pub const LIST_ITEMS: &str = "SELECT id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at FROM auction_items ORDER BY created_at DESC";

/// Listings whose title matches a search term, newest first
pub const SEARCH_ITEMS: &str = "SELECT id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at FROM auction_items WHERE title ILIKE $1 ORDER BY created_at DESC";

/// New listing
pub const INSERT_ITEM: &str = r#"
    INSERT INTO auction_items (owner_id, title, description, starting_bid, image, end_datetime)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at
"#;

/// Bid ledger for an item, default order: amount descending, earliest first
/// within a tie
pub const GET_ITEM_BIDS: &str = r#"
    SELECT id, item_id, bidder_id, amount, timestamp
    FROM bids
    WHERE item_id = $1
    ORDER BY amount DESC, timestamp ASC
"#;

/// Bid ledger for an item in the order the bids arrived
pub const GET_ITEM_BIDS_CHRONOLOGICAL: &str = r#"
    SELECT id, item_id, bidder_id, amount, timestamp
    FROM bids
    WHERE item_id = $1
    ORDER BY timestamp ASC, id ASC
"#;

/// Append to the bid ledger
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (item_id, bidder_id, amount)
    VALUES ($1, $2, $3)
    RETURNING id, item_id, bidder_id, amount, timestamp
"#;

/// Cache the accepted bid on the item
pub const UPDATE_CURRENT_BID: &str = "UPDATE auction_items SET current_bid = $1 WHERE id = $2";

/// Items whose auction has ended and that no closer pass has handled yet
pub const FIND_DUE_ITEM_IDS: &str = "SELECT id FROM auction_items WHERE end_datetime <= $1 AND NOT ended_processed ORDER BY end_datetime ASC";

/// Re-select a due item under lock. The ended_processed filter makes a second
/// pass (or a concurrent one) skip items already finalized.
pub const GET_DUE_ITEM_FOR_UPDATE: &str = "SELECT id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at FROM auction_items WHERE id = $1 AND NOT ended_processed FOR UPDATE";

/// Finalize an item nobody bid on
pub const CLOSE_UNSOLD: &str = "UPDATE auction_items SET ended_processed = TRUE WHERE id = $1";

/// Finalize an item with a winner. winner_notified_at stays null when the
/// notification was not delivered.
pub const CLOSE_WITH_WINNER: &str = "UPDATE auction_items SET winner_id = $1, winning_bid = $2, winner_notified_at = $3, ended_processed = TRUE WHERE id = $4";

/// User lookup
pub const GET_USER: &str =
    "SELECT id, username, email, date_of_birth, profile_image FROM users WHERE id = $1";

/// Partial profile update, absent fields keep their value
pub const UPDATE_PROFILE: &str = r#"
    UPDATE users
    SET email = COALESCE($1, email),
        date_of_birth = COALESCE($2, date_of_birth),
        profile_image = COALESCE($3, profile_image)
    WHERE id = $4
    RETURNING id, username, email, date_of_birth, profile_image
"#;

/// Question lookup
pub const GET_QUESTION: &str = "SELECT id, item_id, asked_by, question_text, answer_text, asked_at, answered_at FROM item_questions WHERE id = $1";

/// Owner of the item a question was asked about
pub const GET_QUESTION_ITEM_OWNER: &str = r#"
    SELECT ai.owner_id
    FROM item_questions q
    JOIN auction_items ai ON ai.id = q.item_id
    WHERE q.id = $1
"#;

/// Questions asked about an item, oldest first
pub const GET_ITEM_QUESTIONS: &str = "SELECT id, item_id, asked_by, question_text, answer_text, asked_at, answered_at FROM item_questions WHERE item_id = $1 ORDER BY asked_at ASC";

/// New question
pub const INSERT_QUESTION: &str = r#"
    INSERT INTO item_questions (item_id, asked_by, question_text)
    VALUES ($1, $2, $3)
    RETURNING id, item_id, asked_by, question_text, answer_text, asked_at, answered_at
"#;

/// Answer (or re-answer) a question; overwrites, no history kept
pub const ANSWER_QUESTION: &str = r#"
    UPDATE item_questions
    SET answer_text = $1, answered_at = $2
    WHERE id = $3
    RETURNING id, item_id, asked_by, question_text, answer_text, asked_at, answered_at
"#;
